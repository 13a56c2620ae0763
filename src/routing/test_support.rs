//! 路由层测试用的内存聚合器。

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::api::lifi::quote::{QuoteAction, QuoteEstimate, QuoteToken};
use crate::api::{
    AggregatorApi, LifiError, QuoteRequest, QuoteResponse, QuoteResponsePayload, TokenRequest,
    TokenResponse,
};

#[derive(Debug, Clone)]
struct CannedQuote {
    from_decimals: u8,
    to_decimals: u8,
    rate: Decimal,
    tool: String,
    duration: f64,
}

/// 按 (链, 代币) 返回预置代币信息，按 (源链, 源地址, 目标链, 目标地址) 以固定汇率报价。
/// 未预置的代币或报价一律返回 404。
#[derive(Debug, Default)]
pub struct MockAggregator {
    tokens: HashMap<(u64, String), TokenResponse>,
    quotes: HashMap<(u64, String, u64, String), CannedQuote>,
    quote_calls: AtomicUsize,
    requests: Mutex<Vec<QuoteRequest>>,
}

impl MockAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(
        mut self,
        chain: u64,
        token: &str,
        address: &str,
        decimals: Option<u8>,
        price_usd: Option<&str>,
    ) -> Self {
        let response = TokenResponse {
            address: address.to_string(),
            decimals,
            price_usd: price_usd.map(|raw| raw.parse().expect("price literal")),
            symbol: Some(token.to_string()),
            chain_id: Some(chain),
        };
        self.tokens.insert((chain, token.to_string()), response.clone());
        self.tokens.insert((chain, address.to_string()), response);
        self
    }

    /// `rate`：每单位输入可得的输出数量（均为人类可读单位）。
    #[allow(clippy::too_many_arguments)]
    pub fn with_quote(
        self,
        from_chain: u64,
        from_token: &str,
        from_decimals: u8,
        to_chain: u64,
        to_token: &str,
        to_decimals: u8,
        rate: Decimal,
    ) -> Self {
        self.with_tool_quote(
            from_chain,
            from_token,
            from_decimals,
            to_chain,
            to_token,
            to_decimals,
            rate,
            "mock-bridge",
            30.0,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_tool_quote(
        mut self,
        from_chain: u64,
        from_token: &str,
        from_decimals: u8,
        to_chain: u64,
        to_token: &str,
        to_decimals: u8,
        rate: Decimal,
        tool: &str,
        duration: f64,
    ) -> Self {
        self.quotes.insert(
            (
                from_chain,
                from_token.to_string(),
                to_chain,
                to_token.to_string(),
            ),
            CannedQuote {
                from_decimals,
                to_decimals,
                rate,
                tool: tool.to_string(),
                duration,
            },
        );
        self
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

fn not_found(endpoint: &str) -> LifiError {
    LifiError::ApiStatus {
        endpoint: endpoint.to_string(),
        status: StatusCode::NOT_FOUND,
        body: "not found".to_string(),
    }
}

fn pow10(exp: u8) -> Decimal {
    (0..exp).fold(Decimal::ONE, |acc, _| acc * Decimal::TEN)
}

#[async_trait]
impl AggregatorApi for MockAggregator {
    async fn token(&self, request: &TokenRequest) -> Result<TokenResponse, LifiError> {
        self.tokens
            .get(&(request.chain.as_u64(), request.token.trim().to_string()))
            .cloned()
            .ok_or_else(|| not_found("/token"))
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, LifiError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let key = (
            request.from_chain.as_u64(),
            request.from_token.clone(),
            request.to_chain.as_u64(),
            request.to_token.clone(),
        );
        let canned = self.quotes.get(&key).ok_or_else(|| not_found("/quote"))?;

        let from_human = Decimal::from_i128_with_scale(
            request.from_amount as i128,
            u32::from(canned.from_decimals),
        );
        let to_raw = (from_human * canned.rate * pow10(canned.to_decimals))
            .trunc()
            .to_u128()
            .ok_or_else(|| LifiError::Schema("mock amount overflow".to_string()))?;

        Ok(QuoteResponse::from_payload(QuoteResponsePayload {
            tool: canned.tool.clone(),
            action: QuoteAction {
                from_token: QuoteToken {
                    address: request.from_token.clone(),
                    decimals: canned.from_decimals,
                    symbol: None,
                },
                to_token: QuoteToken {
                    address: request.to_token.clone(),
                    decimals: canned.to_decimals,
                    symbol: None,
                },
            },
            estimate: QuoteEstimate {
                from_amount: request.from_amount,
                to_amount: to_raw,
                execution_duration: canned.duration,
            },
        }))
    }
}
