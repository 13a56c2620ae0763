use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// 有界重试：指数退避，上限截断，并加入最多 25% 的随机抖动。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
            max_backoff: max_backoff.max(base_backoff),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 第 `attempt` 次（从 1 开始）失败后的等待时长，不含抖动。
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let jitter_cap = base.as_millis() as u64 / 4;
        if jitter_cap == 0 {
            return base;
        }
        let jitter = rand::rng().random_range(0..=jitter_cap);
        base + Duration::from_millis(jitter)
    }
}
