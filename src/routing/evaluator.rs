use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{Level, debug, warn};
use uuid::Uuid;

use crate::api::AggregatorApi;
use crate::config::{ApiConfig, RoutingConfig};
use crate::monitoring::{LatencyMetadata, events, guard_with_level, measure_result};
use crate::registry::{canonical_chain_name, chain_id};

use super::error::{RoutingError, RoutingResult};
use super::planner::Strategy;
use super::quoter::HopQuoter;
use super::resolver::AssetResolver;
use super::runner::MultiHopRunner;
use super::types::{Alternative, Candidate, Evaluation, RouteRequest};

const MAX_WORKERS: usize = Strategy::ALL.len();

/// 并发执行全部策略并按累计效率挑选最优路线。
#[derive(Clone)]
pub struct RouteEvaluator {
    runner: MultiHopRunner,
    hub_chain: String,
    max_concurrency: usize,
}

impl RouteEvaluator {
    pub fn new(runner: MultiHopRunner, hub_chain: impl Into<String>, max_concurrency: usize) -> Self {
        let hub_chain = hub_chain.into();
        let hub_chain = canonical_chain_name(&hub_chain)
            .map(str::to_string)
            .unwrap_or(hub_chain);
        Self {
            runner,
            hub_chain,
            max_concurrency: max_concurrency.clamp(1, MAX_WORKERS),
        }
    }

    pub fn from_config(
        api: Arc<dyn AggregatorApi>,
        api_config: &ApiConfig,
        routing: &RoutingConfig,
    ) -> Result<Self, url::ParseError> {
        let resolver = AssetResolver::new(Arc::clone(&api));
        let quoter = HopQuoter::new(api, &api_config.link_base)?;
        Ok(Self::new(
            MultiHopRunner::new(resolver, quoter),
            routing.hub_chain.clone(),
            routing.max_concurrency,
        ))
    }

    /// 不返回错误：全部策略失败时得到 `Evaluation::Unavailable`。
    pub async fn evaluate(&self, request: RouteRequest) -> Evaluation {
        let evaluation_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        events::evaluation_started(&evaluation_id, &request, &self.hub_chain);
        let guard = guard_with_level(
            "routing.evaluate",
            Level::DEBUG,
            LatencyMetadata::from_pairs([
                ("evaluation_id", evaluation_id.clone()),
                ("src_chain", request.src_chain.clone()),
                ("dst_chain", request.dst_chain.clone()),
            ]),
        );

        if let Some(unknown) = [&request.src_chain, &request.dst_chain]
            .into_iter()
            .find(|name| chain_id(name).is_none())
        {
            let err = RoutingError::UnknownChain(unknown.clone());
            warn!(
                target: "routing::evaluator",
                evaluation_id = %evaluation_id,
                error = %err,
                "链名称无法识别，直接返回不可用"
            );
            let evaluation = Evaluation::Unavailable(Candidate::unavailable());
            guard.finish();
            events::evaluation_finished(&evaluation_id, &evaluation, 0, started.elapsed());
            return evaluation;
        }

        let candidates = self.run_strategies(&evaluation_id, Arc::new(request)).await;
        let count = candidates.len();
        let evaluation = rank_candidates(candidates);
        guard.finish();
        events::evaluation_finished(&evaluation_id, &evaluation, count, started.elapsed());
        evaluation
    }

    /// 结果按完成先后排列。
    async fn run_strategies(
        &self,
        evaluation_id: &str,
        request: Arc<RouteRequest>,
    ) -> Vec<Candidate> {
        let queue = Arc::new(Mutex::new(VecDeque::from(Strategy::ALL.to_vec())));
        let completed = Arc::new(Mutex::new(Vec::with_capacity(MAX_WORKERS)));
        let evaluation_id: Arc<str> = Arc::from(evaluation_id);

        let mut join_set = JoinSet::new();
        for _ in 0..self.max_concurrency {
            let queue = Arc::clone(&queue);
            let completed = Arc::clone(&completed);
            let request = Arc::clone(&request);
            let evaluation_id = Arc::clone(&evaluation_id);
            let evaluator = self.clone();

            join_set.spawn(async move {
                loop {
                    let strategy = {
                        let mut guard = queue.lock().await;
                        guard.pop_front()
                    };
                    let Some(strategy) = strategy else {
                        break;
                    };

                    let started = Instant::now();
                    let outcome = measure_result(
                        "routing.strategy",
                        Level::DEBUG,
                        LatencyMetadata::from_pairs([
                            ("evaluation_id", evaluation_id.to_string()),
                            ("kind", strategy.kind().as_str().to_string()),
                        ]),
                        evaluator.run_strategy(strategy, &request),
                    )
                    .await;
                    match outcome {
                        Ok(candidate) => {
                            events::strategy_finished(
                                &evaluation_id,
                                strategy.kind(),
                                "accepted",
                                candidate.route.steps.len(),
                                started.elapsed(),
                            );
                            completed.lock().await.push(candidate);
                        }
                        Err(err) => {
                            debug!(
                                target: "routing::evaluator",
                                evaluation_id = %evaluation_id,
                                strategy = strategy.kind().as_str(),
                                error = %err.describe(),
                                "策略未产生可用路线"
                            );
                            events::strategy_finished(
                                &evaluation_id,
                                strategy.kind(),
                                err.label(),
                                0,
                                started.elapsed(),
                            );
                        }
                    }
                }
            });
        }

        while let Some(res) = join_set.join_next().await {
            if let Err(join_err) = res {
                events::strategy_task_failed(&evaluation_id, &join_err.to_string());
            }
        }

        let mut guard = completed.lock().await;
        std::mem::take(&mut *guard)
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        request: &RouteRequest,
    ) -> RoutingResult<Candidate> {
        let kind = strategy.kind();
        let hops = strategy
            .plan(request, &self.hub_chain)
            .ok_or_else(|| RoutingError::StrategyUnavailable {
                kind,
                reason: format!("端点包含中转链 {}", self.hub_chain),
            })?;

        let route = self
            .runner
            .run(&hops, request.amount, request.order)
            .await
            .ok_or_else(|| RoutingError::StrategyUnavailable {
                kind,
                reason: "存在失败的跳".to_string(),
            })?;

        if route.steps.len() < strategy.min_hops() {
            return Err(RoutingError::StrategyUnavailable {
                kind,
                reason: format!(
                    "仅 {} 跳成功，至少需要 {}",
                    route.steps.len(),
                    strategy.min_hops()
                ),
            });
        }

        Ok(Candidate::new(kind, strategy.description(), route))
    }
}

/// 选出累计效率最高者；并列时保留先完成的。
pub fn rank_candidates(candidates: Vec<Candidate>) -> Evaluation {
    let usable: Vec<Candidate> = candidates
        .into_iter()
        .filter(|candidate| !candidate.route.steps.is_empty())
        .collect();
    if usable.is_empty() {
        return Evaluation::Unavailable(Candidate::unavailable());
    }

    let mut best_index = 0;
    for (index, candidate) in usable.iter().enumerate().skip(1) {
        if candidate.efficiency_value() > usable[best_index].efficiency_value() {
            best_index = index;
        }
    }

    let mut alternatives = Vec::with_capacity(usable.len() - 1);
    let mut best = None;
    for (index, candidate) in usable.into_iter().enumerate() {
        if index == best_index {
            best = Some(candidate);
        } else {
            alternatives.push(Alternative::from(candidate));
        }
    }

    match best {
        Some(best) => Evaluation::Found { best, alternatives },
        None => Evaluation::Unavailable(Candidate::unavailable()),
    }
}
