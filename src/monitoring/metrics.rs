use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;

use crate::config::PrometheusConfig;

static EXPORTER: OnceCell<()> = OnceCell::new();
static PROMETHEUS_ENABLED: AtomicBool = AtomicBool::new(false);

/// 按配置安装 Prometheus exporter；未启用时所有指标调用都会被跳过。
pub fn init_from_config(config: &PrometheusConfig) -> Result<bool> {
    if !config.enable {
        return Ok(false);
    }
    try_init_prometheus(&config.listen)?;
    Ok(true)
}

pub fn try_init_prometheus(listen: &str) -> Result<()> {
    EXPORTER
        .get_or_try_init(|| {
            let addr: SocketAddr = listen
                .parse()
                .with_context(|| format!("invalid prometheus listen address: {listen}"))?;
            PrometheusBuilder::new()
                .with_http_listener(addr)
                .install()
                .context("failed to install prometheus exporter")?;
            describe_metrics();
            PROMETHEUS_ENABLED.store(true, Ordering::Relaxed);
            Ok(())
        })
        .map(|_| ())
}

pub fn prometheus_enabled() -> bool {
    PROMETHEUS_ENABLED.load(Ordering::Relaxed)
}

fn describe_metrics() {
    describe_counter!(
        "meridian_lifi_request_total",
        "LI.FI 请求次数，按 endpoint/status/http_status 区分"
    );
    describe_histogram!("meridian_lifi_latency_ms", "LI.FI 成功请求耗时（毫秒）");
    describe_counter!("meridian_strategy_total", "路线策略执行结果计数");
    describe_counter!("meridian_evaluation_total", "路线评估结果计数");
}
