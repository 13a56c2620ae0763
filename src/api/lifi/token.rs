use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::ChainId;

/// `/token` 请求：链 ID + 符号或地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub chain: ChainId,
    pub token: String,
}

impl TokenRequest {
    pub fn new(chain: ChainId, token: impl Into<String>) -> Self {
        Self {
            chain,
            token: token.into(),
        }
    }

    pub fn to_query_params(&self) -> Vec<(String, String)> {
        vec![
            ("chain".to_string(), self.chain.to_string()),
            ("token".to_string(), self.token.trim().to_string()),
        ]
    }
}

/// `/token` 响应体；`priceUSD` 既可能是字符串也可能是数字。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub address: String,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default, rename = "priceUSD")]
    pub price_usd: Option<Decimal>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
}

impl TokenResponse {
    pub fn try_from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
