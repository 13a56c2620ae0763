use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};

use crate::registry::ChainId;
use crate::routing::RouteOrder;

/// `/quote` 请求，使用查询字符串传参。
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub from_chain: ChainId,
    pub to_chain: ChainId,
    pub from_token: String,
    pub to_token: String,
    pub from_address: String,
    pub to_address: String,
    /// 最小单位的原始整数金额。
    pub from_amount: u128,
    pub order: RouteOrder,
}

impl QuoteRequest {
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        vec![
            ("fromChain".to_string(), self.from_chain.to_string()),
            ("toChain".to_string(), self.to_chain.to_string()),
            ("fromToken".to_string(), self.from_token.clone()),
            ("toToken".to_string(), self.to_token.clone()),
            ("fromAddress".to_string(), self.from_address.clone()),
            ("toAddress".to_string(), self.to_address.clone()),
            ("fromAmount".to_string(), self.from_amount.to_string()),
            ("order".to_string(), self.order.as_str().to_string()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteToken {
    pub address: String,
    pub decimals: u8,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteAction {
    pub from_token: QuoteToken,
    pub to_token: QuoteToken,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEstimate {
    #[serde_as(as = "DisplayFromStr")]
    pub from_amount: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub to_amount: u128,
    /// 预计执行时长（秒）。
    pub execution_duration: f64,
}

/// `/quote` 响应体中用到的字段。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponsePayload {
    pub tool: String,
    pub action: QuoteAction,
    pub estimate: QuoteEstimate,
}

#[derive(Clone, Debug)]
pub struct QuoteResponse {
    data: QuoteResponsePayload,
}

impl QuoteResponse {
    pub fn try_from_value(value: Value) -> Result<Self, serde_json::Error> {
        let data: QuoteResponsePayload = serde_json::from_value(value)?;
        Ok(Self { data })
    }

    pub fn from_payload(data: QuoteResponsePayload) -> Self {
        Self { data }
    }

    pub fn payload(&self) -> &QuoteResponsePayload {
        &self.data
    }
}
