use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::registry::{ChainId, chain_id};

use super::error::{RoutingError, RoutingResult};
use super::quoter::{HopQuoter, PreparedHop};
use super::resolver::{AssetResolver, convert_amount};
use super::types::{EfficiencyPercent, Hop, HopResult, ResolvedAsset, RouteOrder, RouteResult};

/// 顺序执行多跳：上一跳的预期产出作为下一跳的输入。
#[derive(Clone)]
pub struct MultiHopRunner {
    resolver: AssetResolver,
    quoter: HopQuoter,
}

struct HopOutcome {
    result: HopResult,
    from_asset: ResolvedAsset,
    to_asset: ResolvedAsset,
}

impl MultiHopRunner {
    pub fn new(resolver: AssetResolver, quoter: HopQuoter) -> Self {
        Self { resolver, quoter }
    }

    /// 任一跳失败即丢弃整条路线并返回 `None`；空计划同样返回 `None`。
    pub async fn run(
        &self,
        hops: &[Hop],
        initial_amount: Decimal,
        order: RouteOrder,
    ) -> Option<RouteResult> {
        if hops.is_empty() {
            return None;
        }

        let mut steps = Vec::with_capacity(hops.len());
        let mut current_amount = initial_amount;
        let mut total_time_seconds = 0.0;
        let mut usd_in: Option<Decimal> = None;
        let mut usd_out: Option<Decimal> = None;

        for (index, hop) in hops.iter().enumerate() {
            let outcome = match self.run_hop(hop, current_amount, order).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(
                        target: "routing::runner",
                        hop_index = index,
                        hop_count = hops.len(),
                        hop = %hop,
                        reason = err.label(),
                        error = %err.describe(),
                        "跳执行失败，放弃整条路线"
                    );
                    return None;
                }
            };

            current_amount = outcome.result.expected_amount;
            total_time_seconds += outcome.result.execution_time_seconds;

            if index == 0 {
                usd_in = outcome
                    .from_asset
                    .price_usd
                    .and_then(|price| price.checked_mul(initial_amount));
            }
            usd_out = outcome
                .to_asset
                .price_usd
                .and_then(|price| price.checked_mul(current_amount));

            debug!(
                target: "routing::runner",
                hop_index = index,
                hop = %hop,
                tool = %outcome.result.tool,
                amount = %current_amount,
                "跳执行完成"
            );
            steps.push(outcome.result);
        }

        Some(RouteResult {
            steps,
            final_amount_usd: usd_out,
            total_time_seconds,
            cumulative_efficiency: EfficiencyPercent::from_usd(usd_in, usd_out),
        })
    }

    async fn run_hop(
        &self,
        hop: &Hop,
        amount: Decimal,
        order: RouteOrder,
    ) -> RoutingResult<HopOutcome> {
        let from_chain = lookup_chain(&hop.source_chain)?;
        let to_chain = lookup_chain(&hop.dest_chain)?;

        let from_asset = self.resolver.resolve(from_chain, &hop.source_asset).await?;
        let to_asset = self.resolver.resolve(to_chain, &hop.dest_asset).await?;
        let raw_amount = convert_amount(amount, from_asset.decimals)?;

        let prepared = PreparedHop {
            from_chain,
            to_chain,
            from_asset,
            to_asset,
            raw_amount,
        };
        let result = self.quoter.quote(&prepared, order).await?;
        Ok(HopOutcome {
            result,
            from_asset: prepared.from_asset,
            to_asset: prepared.to_asset,
        })
    }
}

fn lookup_chain(name: &str) -> RoutingResult<ChainId> {
    chain_id(name).ok_or_else(|| RoutingError::UnknownChain(name.to_string()))
}
