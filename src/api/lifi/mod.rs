//! LI.FI 聚合器 API 封装：代币解析与跨链报价。

pub mod quote;
pub mod retry;
pub mod token;

mod headers;

use std::error::Error as StdError;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::config::{ApiConfig, LoggingConfig, LoggingProfile, SecretString};
use crate::monitoring::metrics::prometheus_enabled;
use crate::monitoring::{LatencyMetadata, guard_with_level};

use self::headers::build_header_map;

pub use quote::{QuoteRequest, QuoteResponse, QuoteResponsePayload};
pub use retry::RetryPolicy;
pub use token::{TokenRequest, TokenResponse};

#[derive(Debug, Error)]
pub enum LifiError {
    #[error("LI.FI API 请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("请求 {endpoint} 超时（{timeout_ms}ms）")]
    Timeout {
        endpoint: String,
        timeout_ms: u64,
        #[source]
        source: reqwest::Error,
    },
    #[error("响应解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("请求 {endpoint} 返回状态 {status}: {body}")]
    ApiStatus {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("请求 {endpoint} 被限流，状态 {status}: {body}")]
    RateLimited {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("LI.FI 响应结构不符合预期: {0}")]
    Schema(String),
    #[error("构造请求头失败: {0}")]
    Header(String),
}

impl LifiError {
    /// 传输层错误、超时、429 与 5xx 视为可重试。
    pub fn is_transient(&self) -> bool {
        match self {
            LifiError::Http(err) => err.is_connect() || err.is_timeout() || err.is_request(),
            LifiError::Timeout { .. } | LifiError::RateLimited { .. } => true,
            LifiError::ApiStatus { status, .. } => status.is_server_error(),
            LifiError::Json(_) | LifiError::Schema(_) | LifiError::Header(_) => false,
        }
    }

    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            LifiError::ApiStatus { status, .. } | LifiError::RateLimited { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        let mut parts = vec![self.to_string()];
        let mut current = StdError::source(self);
        while let Some(source) = current {
            let text = source.to_string();
            if parts.last().map(|last| last == &text).unwrap_or(false) {
                current = source.source();
                continue;
            }
            parts.push(text);
            current = source.source();
        }
        parts.join(" | caused by: ")
    }
}

/// 路由层依赖的聚合器能力。
#[async_trait]
pub trait AggregatorApi: Send + Sync {
    async fn token(&self, request: &TokenRequest) -> Result<TokenResponse, LifiError>;

    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, LifiError>;
}

#[derive(Clone, Copy)]
enum Endpoint {
    Token,
    Quote,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Token => "/token",
            Endpoint::Quote => "/quote",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Endpoint::Token => "token",
            Endpoint::Quote => "quote",
        }
    }
}

#[derive(Clone)]
pub struct LifiApiClient {
    base_url: String,
    client: reqwest::Client,
    headers: HeaderMap,
    token_timeout: Duration,
    quote_timeout: Duration,
    retry: RetryPolicy,
    log_profile: LoggingProfile,
    slow_quote_warn_ms: u64,
}

impl fmt::Debug for LifiApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifiApiClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.headers.contains_key("x-lifi-api-key"))
            .field("token_timeout", &self.token_timeout)
            .field("quote_timeout", &self.quote_timeout)
            .field("retry", &self.retry)
            .field("log_profile", &self.log_profile)
            .finish()
    }
}

impl LifiApiClient {
    pub fn new(
        client: reqwest::Client,
        api: &ApiConfig,
        api_key: Option<&SecretString>,
        logging: &LoggingConfig,
    ) -> Result<Self, LifiError> {
        let headers =
            build_header_map(api_key).map_err(|err| LifiError::Header(err.to_string()))?;
        Ok(Self {
            base_url: api.base_url.clone(),
            client,
            headers,
            token_timeout: Duration::from_millis(api.timeouts.token_ms),
            quote_timeout: Duration::from_millis(api.timeouts.quote_ms),
            retry: RetryPolicy::from_config(&api.retry),
            log_profile: logging.profile,
            slow_quote_warn_ms: logging.slow_quote_warn_ms,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, endpoint: Endpoint) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.path().trim_start_matches('/')
        )
    }

    fn timeout_for(&self, endpoint: Endpoint) -> Duration {
        match endpoint {
            Endpoint::Token => self.token_timeout,
            Endpoint::Quote => self.quote_timeout,
        }
    }

    /// 发送 GET 请求；对可重试错误按策略退避重试，最终错误原样返回。
    async fn get_json(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<Value, LifiError> {
        let url = self.endpoint(endpoint);
        let mut attempt = 1;
        loop {
            match self.get_json_once(endpoint, &url, params).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts() => {
                    let delay = self.retry.delay_with_jitter(attempt);
                    warn!(
                        target: "lifi::retry",
                        endpoint = endpoint.label(),
                        attempt,
                        max_attempts = self.retry.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "LI.FI 请求失败，准备重试"
                    );
                    self.record_metrics(endpoint, "retry", None, err.http_status());
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_json_once(
        &self,
        endpoint: Endpoint,
        url: &str,
        params: &[(String, String)],
    ) -> Result<Value, LifiError> {
        let timeout = self.timeout_for(endpoint);
        let target_label = endpoint.label();
        let started = Instant::now();

        trace!(
            target: "lifi::http",
            endpoint = target_label,
            url,
            query = %serde_urlencoded::to_string(params).unwrap_or_default(),
            "即将请求 LI.FI"
        );

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .headers(self.headers.clone())
            .query(params)
            .send()
            .await
            .map_err(|err| self.transport_error(endpoint, url, timeout, err, None))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(endpoint, url, timeout, err, Some(status)))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let summary = summarize_error_body(body);
            self.record_metrics(endpoint, "rate_limited", None, Some(status));
            warn!(
                target: "lifi::http",
                endpoint = target_label,
                status = status.as_u16(),
                body = %summary,
                "LI.FI 请求命中限流"
            );
            return Err(LifiError::RateLimited {
                endpoint: url.to_string(),
                status,
                body: summary,
            });
        }

        if !status.is_success() {
            let summary = summarize_error_body(body);
            self.record_metrics(endpoint, "http_error", None, Some(status));
            debug!(
                target: "lifi::http",
                endpoint = target_label,
                status = status.as_u16(),
                body = %summary,
                "LI.FI 返回非 200 状态"
            );
            return Err(LifiError::ApiStatus {
                endpoint: url.to_string(),
                status,
                body: summary,
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|err| {
            self.record_metrics(endpoint, "decode_error", None, Some(status));
            warn!(
                target: "lifi::http",
                endpoint = target_label,
                error = %err,
                "LI.FI 响应 JSON 解析失败"
            );
            LifiError::Json(err)
        })?;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
        self.record_metrics(endpoint, "success", Some(elapsed_ms), Some(status));
        Ok(json)
    }

    fn transport_error(
        &self,
        endpoint: Endpoint,
        url: &str,
        timeout: Duration,
        err: reqwest::Error,
        status: Option<StatusCode>,
    ) -> LifiError {
        if err.is_timeout() {
            let timeout_ms = timeout.as_millis() as u64;
            self.record_metrics(endpoint, "timeout", None, status);
            warn!(
                target: "lifi::http",
                endpoint = endpoint.label(),
                timeout_ms,
                "LI.FI 请求超时"
            );
            LifiError::Timeout {
                endpoint: url.to_string(),
                timeout_ms,
                source: err,
            }
        } else {
            self.record_metrics(endpoint, "transport_error", None, status);
            warn!(
                target: "lifi::http",
                endpoint = endpoint.label(),
                error = %err,
                "LI.FI 请求发送失败"
            );
            LifiError::from(err)
        }
    }

    fn latency_level(&self) -> tracing::Level {
        if self.log_profile.is_verbose() {
            tracing::Level::INFO
        } else {
            tracing::Level::DEBUG
        }
    }

    fn record_metrics(
        &self,
        endpoint: Endpoint,
        status: &'static str,
        elapsed_ms: Option<f64>,
        http_status: Option<StatusCode>,
    ) {
        if !prometheus_enabled() {
            return;
        }
        counter!(
            "meridian_lifi_request_total",
            "endpoint" => endpoint.label(),
            "status" => status,
            "http_status" => http_status
                .map(|code| code.as_u16().to_string())
                .unwrap_or_else(|| "none".to_string())
        )
        .increment(1);
        if let Some(value) = elapsed_ms {
            histogram!(
                "meridian_lifi_latency_ms",
                "endpoint" => endpoint.label()
            )
            .record(value);
        }
    }
}

#[async_trait]
impl AggregatorApi for LifiApiClient {
    async fn token(&self, request: &TokenRequest) -> Result<TokenResponse, LifiError> {
        let metadata = LatencyMetadata::from_pairs([
            ("chain", request.chain.to_string()),
            ("token", request.token.clone()),
        ]);
        let guard = guard_with_level("lifi.token", self.latency_level(), metadata);

        let json = self
            .get_json(Endpoint::Token, &request.to_query_params())
            .await?;
        let token = TokenResponse::try_from_value(json)
            .map_err(|err| LifiError::Schema(format!("解析代币响应失败: {err}")))?;

        guard.finish();
        debug!(
            target: "lifi::token",
            chain = %request.chain,
            token = %request.token,
            address = %token.address,
            decimals = ?token.decimals,
            price_usd = ?token.price_usd,
            "代币解析完成"
        );
        Ok(token)
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, LifiError> {
        let metadata = LatencyMetadata::from_pairs([
            ("from_chain", request.from_chain.to_string()),
            ("to_chain", request.to_chain.to_string()),
            ("order", request.order.to_string()),
        ]);
        let guard = guard_with_level("lifi.quote", self.latency_level(), metadata);
        let started = Instant::now();

        trace!(
            target: "lifi::quote",
            from_chain = %request.from_chain,
            to_chain = %request.to_chain,
            from_token = %request.from_token,
            to_token = %request.to_token,
            from_amount = %request.from_amount,
            order = %request.order,
            "开始请求 LI.FI 报价"
        );

        let json = self
            .get_json(Endpoint::Quote, &request.to_query_params())
            .await?;
        let quote = QuoteResponse::try_from_value(json)
            .map_err(|err| LifiError::Schema(format!("解析报价响应失败: {err}")))?;

        guard.finish();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
        if elapsed_ms > self.slow_quote_warn_ms as f64 {
            debug!(
                target: "lifi::quote",
                elapsed_ms = %format!("{elapsed_ms:.3}"),
                threshold_ms = self.slow_quote_warn_ms,
                "LI.FI 报价耗时较长"
            );
        } else {
            debug!(
                target: "lifi::quote",
                elapsed_ms = %format!("{elapsed_ms:.3}"),
                tool = %quote.payload().tool,
                to_amount = %quote.payload().estimate.to_amount,
                "LI.FI 报价完成"
            );
        }
        Ok(quote)
    }
}

fn summarize_error_body(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response body)".to_string();
    }
    let mut single_line = trimmed.replace(['\n', '\r'], " ");
    const MAX_LEN: usize = 512;
    if single_line.len() > MAX_LEN {
        let mut cut = MAX_LEN;
        while !single_line.is_char_boundary(cut) {
            cut -= 1;
        }
        single_line.truncate(cut);
        single_line.push('…');
    }
    single_line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ChainId;
    use crate::routing::RouteOrder;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> LifiApiClient {
        let api = ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::default()
        };
        let key = api_key.map(SecretString::from);
        LifiApiClient::new(
            reqwest::Client::new(),
            &api,
            key.as_ref(),
            &LoggingConfig::default(),
        )
        .expect("client")
        .with_retry(RetryPolicy::new(
            3,
            Duration::from_millis(1),
            Duration::from_millis(2),
        ))
    }

    fn sample_quote_request() -> QuoteRequest {
        QuoteRequest {
            from_chain: ChainId(1),
            to_chain: ChainId(8453),
            from_token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
            to_token: "0x0000000000000000000000000000000000000000".to_string(),
            from_address: "0xb29601eB52a052042FB6c68C69a442BD0AE90082".to_string(),
            to_address: "0xb29601eB52a052042FB6c68C69a442BD0AE90082".to_string(),
            from_amount: 100_000_000,
            order: RouteOrder::Cheapest,
        }
    }

    #[tokio::test]
    async fn token_lookup_sends_api_key_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .and(query_param("chain", "1"))
            .and(query_param("token", "USDC"))
            .and(header("x-lifi-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                "decimals": 6,
                "priceUSD": "1.0001"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let token = client
            .token(&TokenRequest::new(ChainId(1), "USDC"))
            .await
            .expect("token response");
        assert_eq!(token.decimals, Some(6));
        assert_eq!(token.price_usd, "1.0001".parse().ok());
    }

    #[tokio::test]
    async fn quote_non_success_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("{\"message\":\"No available quotes\"}"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client
            .quote(&sample_quote_request())
            .await
            .expect_err("404 must fail");
        assert!(matches!(err, LifiError::ApiStatus { status, .. } if status == StatusCode::NOT_FOUND));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn quote_retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .and(query_param("order", "CHEAPEST"))
            .and(query_param("fromAmount", "100000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tool": "across",
                "action": {
                    "fromToken": {"address": "0xA0b8", "decimals": 6},
                    "toToken": {"address": "0x0000", "decimals": 18}
                },
                "estimate": {
                    "fromAmount": "100000000",
                    "toAmount": "40000000000000000",
                    "executionDuration": 12
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let quote = client
            .quote(&sample_quote_request())
            .await
            .expect("quote after retries");
        assert_eq!(quote.payload().tool, "across");
        assert_eq!(quote.payload().estimate.to_amount, 40_000_000_000_000_000);
    }

    #[tokio::test]
    async fn rate_limit_exhausts_bounded_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client
            .token(&TokenRequest::new(ChainId(1), "USDC"))
            .await
            .expect_err("rate limited");
        assert!(matches!(err, LifiError::RateLimited { ref body, .. } if body == "slow down"));
    }

    #[tokio::test]
    async fn schema_mismatch_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tool": "x"})))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client
            .quote(&sample_quote_request())
            .await
            .expect_err("schema error");
        assert!(matches!(err, LifiError::Schema(_)));
    }

    #[test]
    fn summarize_collapses_newlines_and_truncates() {
        assert_eq!(summarize_error_body("  ".to_string()), "(empty response body)");
        assert_eq!(summarize_error_body("a\nb\r".to_string()), "a b");
        let long = "x".repeat(600);
        let summary = summarize_error_body(long);
        assert!(summary.ends_with('…'));
        assert_eq!(summary.chars().count(), 513);
    }
}
