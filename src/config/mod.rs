pub mod loader;
pub mod secret;
pub mod types;

pub use loader::*;
pub use secret::SecretString;
pub use types::*;

use self::types as cfg;

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_logging_profile() -> cfg::LoggingProfile {
    cfg::LoggingProfile::Lean
}

pub(crate) fn default_slow_quote_warn_ms() -> u64 {
    1_500
}

pub(crate) fn default_timezone_offset_hours() -> i8 {
    0
}

pub(crate) fn default_api_base_url() -> String {
    "https://li.quest/v1".to_string()
}

pub(crate) fn default_link_base() -> String {
    "https://jumper.exchange/".to_string()
}

pub(crate) fn default_api_key_env() -> String {
    "LIFI_API_KEY".to_string()
}

pub(crate) fn default_token_timeout_ms() -> u64 {
    5_000
}

pub(crate) fn default_quote_timeout_ms() -> u64 {
    15_000
}

pub(crate) fn default_retry_max_attempts() -> u32 {
    3
}

pub(crate) fn default_retry_base_backoff_ms() -> u64 {
    250
}

pub(crate) fn default_retry_max_backoff_ms() -> u64 {
    2_000
}

pub(crate) fn default_hub_chain() -> String {
    "Base".to_string()
}

pub(crate) fn default_max_concurrency() -> usize {
    4
}

pub(crate) fn default_prometheus_listen() -> String {
    "0.0.0.0:9898".to_string()
}

impl Default for cfg::MeridianConfig {
    fn default() -> Self {
        Self {
            global: cfg::GlobalConfig::default(),
            api: cfg::ApiConfig::default(),
            routing: cfg::RoutingConfig::default(),
            prometheus: cfg::PrometheusConfig::default(),
        }
    }
}

impl Default for cfg::LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            json: false,
            profile: default_logging_profile(),
            slow_quote_warn_ms: default_slow_quote_warn_ms(),
            timezone_offset_hours: default_timezone_offset_hours(),
        }
    }
}

impl Default for cfg::ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            link_base: default_link_base(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeouts: cfg::ApiTimeoutConfig::default(),
            retry: cfg::RetryConfig::default(),
        }
    }
}

impl Default for cfg::ApiTimeoutConfig {
    fn default() -> Self {
        Self {
            token_ms: default_token_timeout_ms(),
            quote_ms: default_quote_timeout_ms(),
        }
    }
}

impl Default for cfg::RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            base_backoff_ms: default_retry_base_backoff_ms(),
            max_backoff_ms: default_retry_max_backoff_ms(),
        }
    }
}

impl Default for cfg::RoutingConfig {
    fn default() -> Self {
        Self {
            hub_chain: default_hub_chain(),
            default_order: Default::default(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for cfg::PrometheusConfig {
    fn default() -> Self {
        Self {
            enable: false,
            listen: default_prometheus_listen(),
        }
    }
}
