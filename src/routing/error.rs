use thiserror::Error;

use crate::api::LifiError;
use crate::registry::ChainId;

use super::types::RouteKind;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("未知链名称: {0}")]
    UnknownChain(String),
    #[error("解析代币 '{token}' 失败（链 {chain}）: {source}")]
    Resolution {
        token: String,
        chain: ChainId,
        #[source]
        source: LifiError,
    },
    #[error("金额换算溢出: {amount} × 10^{decimals}")]
    AmountOverflow { amount: String, decimals: u8 },
    #[error("报价不可用 {from_chain} -> {to_chain}: {source}")]
    QuoteUnavailable {
        from_chain: ChainId,
        to_chain: ChainId,
        #[source]
        source: LifiError,
    },
    #[error("报价数值异常: {0}")]
    QuoteMath(String),
    #[error("策略 {kind} 不可用: {reason}")]
    StrategyUnavailable { kind: RouteKind, reason: String },
}

impl RoutingError {
    /// 输出带 source 链的完整错误描述，用于日志。
    pub fn describe(&self) -> String {
        use std::error::Error as _;
        let mut parts = vec![self.to_string()];
        let mut current = self.source();
        while let Some(err) = current {
            let text = err.to_string();
            if !parts.iter().any(|part| part.contains(&text)) {
                parts.push(text);
            }
            current = err.source();
        }
        parts.join(" | caused by: ")
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoutingError::UnknownChain(_) => "unknown_chain",
            RoutingError::Resolution { .. } => "resolution",
            RoutingError::AmountOverflow { .. } => "amount_overflow",
            RoutingError::QuoteUnavailable { .. } => "quote_unavailable",
            RoutingError::QuoteMath(_) => "quote_math",
            RoutingError::StrategyUnavailable { .. } => "strategy_unavailable",
        }
    }
}

pub type RoutingResult<T> = Result<T, RoutingError>;
