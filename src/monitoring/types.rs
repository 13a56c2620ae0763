use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::Level;

/// 附加在耗时日志上的键值对，按 key 排序输出。
#[derive(Debug, Clone, Default)]
pub struct LatencyMetadata {
    fields: Arc<BTreeMap<String, String>>,
}

impl LatencyMetadata {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.to_string()))
                .collect(),
        )
    }

    fn summary(&self) -> Option<String> {
        if self.fields.is_empty() {
            return None;
        }
        Some(
            self.fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

/// 作用域耗时守卫：显式 `finish` 或 drop 时输出一次 `latency` 日志。
#[derive(Debug)]
pub struct LatencyGuard {
    operation: Cow<'static, str>,
    start: Instant,
    level: Level,
    metadata: LatencyMetadata,
    ended: AtomicBool,
}

impl LatencyGuard {
    pub fn new(
        operation: impl Into<Cow<'static, str>>,
        level: Level,
        metadata: LatencyMetadata,
    ) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
            level,
            metadata,
            ended: AtomicBool::new(false),
        }
    }

    pub fn finish(&self) -> Duration {
        let elapsed = self.start.elapsed();
        if !self.ended.swap(true, Ordering::SeqCst) {
            log_latency(self.level, &self.operation, elapsed, &self.metadata);
        }
        elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        if !self.ended.swap(true, Ordering::SeqCst) {
            log_latency(
                self.level,
                &self.operation,
                self.start.elapsed(),
                &self.metadata,
            );
        }
    }
}

fn log_latency(level: Level, operation: &str, elapsed: Duration, metadata: &LatencyMetadata) {
    let elapsed_us = elapsed.as_micros() as u64;
    let elapsed_ms = format!("{:.3}", elapsed.as_secs_f64() * 1_000.0);
    let metadata = metadata.summary().unwrap_or_default();

    macro_rules! log_event {
        ($macro:ident) => {
            tracing::$macro!(
                target: "latency",
                %operation,
                elapsed_us,
                elapsed_ms = %elapsed_ms,
                metadata = %metadata,
                "耗时统计"
            )
        };
    }

    match level {
        Level::ERROR => log_event!(error),
        Level::WARN => log_event!(warn),
        Level::INFO => log_event!(info),
        Level::DEBUG => log_event!(debug),
        Level::TRACE => log_event!(trace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_summary_is_sorted() {
        let metadata = LatencyMetadata::from_pairs([("to_chain", 8453u64), ("from_chain", 1u64)]);
        assert_eq!(
            metadata.summary().as_deref(),
            Some("from_chain=1 to_chain=8453")
        );
        assert!(LatencyMetadata::default().summary().is_none());
    }

    #[test]
    fn finish_is_idempotent() {
        let guard = LatencyGuard::new("test.op", Level::TRACE, LatencyMetadata::default());
        assert!(!guard.is_finished());
        let first = guard.finish();
        let second = guard.finish();
        assert!(guard.is_finished());
        assert!(second >= first);
    }
}
