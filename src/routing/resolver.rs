use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::api::{AggregatorApi, TokenRequest};
use crate::registry::{ChainId, looks_like_address};

use super::error::{RoutingError, RoutingResult};
use super::types::ResolvedAsset;

/// 通过聚合器 `/token` 接口解析代币。
///
/// 地址与符号一律走远端查询：效率计算需要 USD 价格，而地址直传拿不到价格。
#[derive(Clone)]
pub struct AssetResolver {
    api: Arc<dyn AggregatorApi>,
}

impl AssetResolver {
    pub fn new(api: Arc<dyn AggregatorApi>) -> Self {
        Self { api }
    }

    pub async fn resolve(&self, chain: ChainId, token: &str) -> RoutingResult<ResolvedAsset> {
        let input_kind = if looks_like_address(token) {
            "address"
        } else {
            "symbol"
        };
        let request = TokenRequest::new(chain, token);
        let response =
            self.api
                .token(&request)
                .await
                .map_err(|source| RoutingError::Resolution {
                    token: token.to_string(),
                    chain,
                    source,
                })?;

        debug!(
            target: "routing::resolver",
            chain = %chain,
            token,
            input_kind,
            address = %response.address,
            decimals = ?response.decimals,
            "代币已解析"
        );

        Ok(ResolvedAsset {
            address: response.address,
            decimals: response.decimals,
            price_usd: response.price_usd,
        })
    }
}

/// 人类可读金额换算为最小单位整数，截断小数部分。
///
/// `decimals` 缺失时视为金额已是原始单位，直接截断。
pub fn convert_amount(human: Decimal, decimals: Option<u8>) -> RoutingResult<u128> {
    let overflow = || RoutingError::AmountOverflow {
        amount: human.to_string(),
        decimals: decimals.unwrap_or(0),
    };
    if human.is_sign_negative() {
        return Err(overflow());
    }

    let scaled = match decimals {
        Some(decimals) => {
            let factor = pow10(decimals).ok_or_else(overflow)?;
            human.checked_mul(factor).ok_or_else(overflow)?
        }
        None => human,
    };

    scaled.trunc().to_u128().ok_or_else(overflow)
}

/// 原始整数金额按精度还原为人类可读数值。
pub fn scale_down(raw: u128, decimals: u8) -> RoutingResult<Decimal> {
    let invalid = || RoutingError::QuoteMath(format!("无法换算金额 {raw}（精度 {decimals}）"));
    let mantissa = i128::try_from(raw).map_err(|_| invalid())?;
    Decimal::try_from_i128_with_scale(mantissa, u32::from(decimals)).map_err(|_| invalid())
}

fn pow10(exp: u8) -> Option<Decimal> {
    let mut value = Decimal::ONE;
    for _ in 0..exp {
        value = value.checked_mul(Decimal::TEN)?;
    }
    Some(value)
}
