use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

use crate::config::SecretString;

const X_LIFI_API_KEY: HeaderName = HeaderName::from_static("x-lifi-api-key");

/// 每个请求都携带的固定头；配置了 key 时附加 `x-lifi-api-key`，并标记为敏感值。
pub(super) fn build_header_map(api_key: Option<&SecretString>) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(key) = api_key {
        let mut value = HeaderValue::from_str(key.expose_secret().trim())?;
        value.set_sensitive(true);
        headers.insert(X_LIFI_API_KEY, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_api_key_when_configured() {
        let key = SecretString::from(" key-123 ");
        let headers = build_header_map(Some(&key)).expect("headers");
        assert_eq!(
            headers.get("x-lifi-api-key").and_then(|v| v.to_str().ok()),
            Some("key-123")
        );
        assert!(headers.get("x-lifi-api-key").is_some_and(|v| v.is_sensitive()));
        assert_eq!(
            headers.get("accept").and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn omits_api_key_when_absent() {
        let headers = build_header_map(None).expect("headers");
        assert!(headers.get("x-lifi-api-key").is_none());
    }

    #[test]
    fn rejects_control_characters_in_key() {
        let key = SecretString::from("bad\nkey");
        assert!(build_header_map(Some(&key)).is_err());
    }
}
