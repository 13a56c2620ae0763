use serde::Deserialize;

use super::secret::SecretString;
use crate::routing::RouteOrder;

#[derive(Debug, Clone, Deserialize)]
pub struct MeridianConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoggingProfile {
    Lean,
    Verbose,
}

impl Default for LoggingProfile {
    fn default() -> Self {
        Self::Lean
    }
}

impl LoggingProfile {
    pub fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "super::default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default = "super::default_logging_profile")]
    pub profile: LoggingProfile,
    #[serde(default = "super::default_slow_quote_warn_ms")]
    pub slow_quote_warn_ms: u64,
    #[serde(default = "super::default_timezone_offset_hours")]
    pub timezone_offset_hours: i8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "super::default_api_base_url")]
    pub base_url: String,
    #[serde(default = "super::default_link_base")]
    pub link_base: String,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default = "super::default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub timeouts: ApiTimeoutConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ApiConfig {
    /// 配置文件中的 key 优先；留空时回退到 `api_key_env` 指向的环境变量。
    pub fn resolve_api_key(&self) -> Option<SecretString> {
        if let Some(key) = self.api_key.as_ref().filter(|key| !key.is_blank()) {
            return Some(key.clone());
        }
        let env_name = self.api_key_env.trim();
        if env_name.is_empty() {
            return None;
        }
        std::env::var(env_name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(SecretString::new)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTimeoutConfig {
    #[serde(default = "super::default_token_timeout_ms")]
    pub token_ms: u64,
    #[serde(default = "super::default_quote_timeout_ms")]
    pub quote_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// 包含首次请求在内的最大尝试次数。
    #[serde(default = "super::default_retry_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "super::default_retry_base_backoff_ms")]
    pub base_backoff_ms: u64,
    #[serde(default = "super::default_retry_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "super::default_hub_chain")]
    pub hub_chain: String,
    #[serde(default)]
    pub default_order: RouteOrder,
    #[serde(default = "super::default_max_concurrency")]
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default = "super::default_prometheus_listen")]
    pub listen: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: MeridianConfig = toml::from_str("").expect("parse toml");
        assert_eq!(config.api.base_url, "https://li.quest/v1");
        assert_eq!(config.api.link_base, "https://jumper.exchange/");
        assert_eq!(config.api.retry.max_attempts, 3);
        assert_eq!(config.routing.hub_chain, "Base");
        assert_eq!(config.routing.default_order, RouteOrder::Cheapest);
        assert_eq!(config.routing.max_concurrency, 4);
        assert_eq!(config.global.logging.level, "info");
        assert!(!config.prometheus.enable);
    }

    #[test]
    fn parses_nested_sections() {
        let raw = r#"
            [global.logging]
            level = "debug"
            profile = "verbose"

            [api]
            api_key = "secret-key"
            [api.timeouts]
            quote_ms = 9000
            [api.retry]
            max_attempts = 5

            [routing]
            hub_chain = "Arbitrum"
            default_order = "FASTEST"
        "#;
        let config: MeridianConfig = toml::from_str(raw).expect("parse toml");
        assert_eq!(config.global.logging.level, "debug");
        assert!(config.global.logging.profile.is_verbose());
        assert_eq!(config.api.timeouts.quote_ms, 9000);
        assert_eq!(config.api.timeouts.token_ms, 5_000);
        assert_eq!(config.api.retry.max_attempts, 5);
        assert_eq!(config.routing.hub_chain, "Arbitrum");
        assert_eq!(config.routing.default_order, RouteOrder::Fastest);
        let key = config.api.resolve_api_key().expect("api key");
        assert_eq!(key.expose_secret(), "secret-key");
    }

    #[test]
    fn blank_api_key_without_env_resolves_to_none() {
        let raw = r#"
            [api]
            api_key = "   "
            api_key_env = ""
        "#;
        let config: MeridianConfig = toml::from_str(raw).expect("parse toml");
        assert!(config.api.resolve_api_key().is_none());
    }
}
