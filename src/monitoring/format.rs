use std::borrow::Cow;

use crate::registry::looks_like_address;

/// 地址缩写为 `0xA0b8..eB48`，符号原样返回。
pub fn short_token(token: &str) -> Cow<'_, str> {
    let trimmed = token.trim();
    if !looks_like_address(trimmed) || trimmed.len() <= 12 {
        return Cow::Borrowed(trimmed);
    }
    let head = if trimmed.starts_with("0x") { 6 } else { 4 };
    Cow::Owned(format!(
        "{}..{}",
        &trimmed[..head],
        &trimmed[trimmed.len() - 4..]
    ))
}
