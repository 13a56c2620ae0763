use std::borrow::Cow;
use std::future::Future;

use tracing::Level;

use super::types::{LatencyGuard, LatencyMetadata};

pub fn guard_with_level(
    operation: impl Into<Cow<'static, str>>,
    level: Level,
    metadata: LatencyMetadata,
) -> LatencyGuard {
    LatencyGuard::new(operation, level, metadata)
}

/// 包装一个返回 `Result` 的 future，无论成败都记录耗时。
pub async fn measure_result<Fut, T, E>(
    operation: impl Into<Cow<'static, str>>,
    level: Level,
    metadata: LatencyMetadata,
    fut: Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    let guard = LatencyGuard::new(operation, level, metadata);
    let res = fut.await;
    guard.finish();
    res
}
