use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;
use url::Url;

use crate::api::{AggregatorApi, QuoteRequest};
use crate::registry::{ChainId, default_address};

use super::error::{RoutingError, RoutingResult};
use super::resolver::scale_down;
use super::types::{HopResult, ResolvedAsset, RouteOrder};

/// 已解析完毕、可直接询价的一跳。
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedHop {
    pub from_chain: ChainId,
    pub to_chain: ChainId,
    pub from_asset: ResolvedAsset,
    pub to_asset: ResolvedAsset,
    pub raw_amount: u128,
}

#[derive(Clone)]
pub struct HopQuoter {
    api: Arc<dyn AggregatorApi>,
    link_base: Url,
}

impl HopQuoter {
    pub fn new(api: Arc<dyn AggregatorApi>, link_base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            api,
            link_base: Url::parse(link_base)?,
        })
    }

    pub async fn quote(&self, hop: &PreparedHop, order: RouteOrder) -> RoutingResult<HopResult> {
        let request = QuoteRequest {
            from_chain: hop.from_chain,
            to_chain: hop.to_chain,
            from_token: hop.from_asset.address.clone(),
            to_token: hop.to_asset.address.clone(),
            from_address: default_address(hop.from_chain).to_string(),
            to_address: default_address(hop.to_chain).to_string(),
            from_amount: hop.raw_amount,
            order,
        };

        let response =
            self.api
                .quote(&request)
                .await
                .map_err(|source| RoutingError::QuoteUnavailable {
                    from_chain: hop.from_chain,
                    to_chain: hop.to_chain,
                    source,
                })?;
        let payload = response.payload();

        let expected_amount = scale_down(
            payload.estimate.to_amount,
            payload.action.to_token.decimals,
        )?;
        let from_amount = scale_down(
            payload.estimate.from_amount,
            payload.action.from_token.decimals,
        )?;
        let efficiency = hop_efficiency(
            from_amount,
            expected_amount,
            hop.from_asset.price_usd,
            hop.to_asset.price_usd,
        );

        debug!(
            target: "routing::quoter",
            from_chain = %hop.from_chain,
            to_chain = %hop.to_chain,
            tool = %payload.tool,
            %expected_amount,
            efficiency = ?efficiency,
            "单跳报价完成"
        );

        Ok(HopResult {
            tool: payload.tool.clone(),
            from_chain: hop.from_chain,
            to_chain: hop.to_chain,
            from_token: request.from_token.clone(),
            to_token: request.to_token.clone(),
            from_amount,
            expected_amount,
            efficiency,
            execution_time_seconds: payload.estimate.execution_duration,
            link: self.deep_link(&request),
        })
    }

    /// 聚合器网页端的跳转链接，仅作展示。
    pub fn deep_link(&self, request: &QuoteRequest) -> String {
        let mut url = self.link_base.clone();
        url.query_pairs_mut()
            .append_pair("fromChain", &request.from_chain.to_string())
            .append_pair("fromToken", &request.from_token)
            .append_pair("toChain", &request.to_chain.to_string())
            .append_pair("toToken", &request.to_token);
        url.into()
    }
}

/// 单跳 USD 产出 / USD 投入；价格缺失或投入为零时无法计算。
fn hop_efficiency(
    from_amount: Decimal,
    expected_amount: Decimal,
    price_from: Option<Decimal>,
    price_to: Option<Decimal>,
) -> Option<Decimal> {
    let usd_in = from_amount.checked_mul(price_from?)?;
    if usd_in.is_zero() {
        return None;
    }
    expected_amount.checked_mul(price_to?)?.checked_div(usd_in)
}
