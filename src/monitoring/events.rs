use std::time::Duration;

use metrics::counter;
use tracing::{debug, info, warn};

use crate::routing::{Evaluation, RouteKind, RouteRequest};

use super::format::short_token;
use super::metrics::prometheus_enabled;

pub fn evaluation_started(evaluation_id: &str, request: &RouteRequest, hub_chain: &str) {
    info!(
        target: "monitoring::route",
        event = "evaluation_start",
        evaluation_id,
        src_chain = %request.src_chain,
        dst_chain = %request.dst_chain,
        src_asset = %short_token(&request.src_asset),
        dst_asset = %short_token(&request.dst_asset),
        amount = %request.amount,
        order = %request.order,
        hub_chain,
        "开始评估跨链路线"
    );
}

pub fn strategy_finished(
    evaluation_id: &str,
    kind: RouteKind,
    outcome: &'static str,
    hops: usize,
    elapsed: Duration,
) {
    debug!(
        target: "monitoring::route",
        event = "strategy_end",
        evaluation_id,
        kind = kind.as_str(),
        outcome,
        hops,
        elapsed_ms = elapsed.as_millis() as u64,
        "策略执行结束"
    );

    if prometheus_enabled() {
        counter!(
            "meridian_strategy_total",
            "kind" => kind.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }
}

/// 策略任务异常退出（panic 或被取消）。
pub fn strategy_task_failed(evaluation_id: &str, error: &str) {
    warn!(
        target: "monitoring::route",
        event = "strategy_task_failed",
        evaluation_id,
        error,
        "策略任务异常退出"
    );

    if prometheus_enabled() {
        counter!(
            "meridian_strategy_total",
            "kind" => "unknown",
            "outcome" => "task_failed"
        )
        .increment(1);
    }
}

pub fn evaluation_finished(
    evaluation_id: &str,
    evaluation: &Evaluation,
    candidates: usize,
    elapsed: Duration,
) {
    let outcome = if evaluation.is_available() {
        "found"
    } else {
        "unavailable"
    };
    match evaluation.best() {
        Some(best) => info!(
            target: "monitoring::route",
            event = "evaluation_end",
            evaluation_id,
            outcome,
            candidates,
            best_kind = best.kind.as_str(),
            best_efficiency = %best.route.cumulative_efficiency,
            best_hops = best.route.steps.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "路线评估完成"
        ),
        None => warn!(
            target: "monitoring::route",
            event = "evaluation_end",
            evaluation_id,
            outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            "没有可用路线"
        ),
    }

    if prometheus_enabled() {
        counter!("meridian_evaluation_total", "outcome" => outcome).increment(1);
    }
}
