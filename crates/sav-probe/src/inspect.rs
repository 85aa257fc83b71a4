//! Header inspection.

use reqwest::header::{HeaderMap, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};

/// Media type a SpaceAPI endpoint is expected to serve.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Compliance signals derived from response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplianceSignals {
    /// The endpoint can be read cross-origin by the validator.
    pub cors: bool,
    /// The endpoint declares a JSON content type.
    pub content_type_ok: bool,
}

/// Derive [`ComplianceSignals`] from response headers.
///
/// `cors` holds when `Access-Control-Allow-Origin` is `*` or exactly
/// `origin`. `content_type_ok` holds when `Content-Type` starts with
/// `application/json`, so parameters such as `charset` are accepted.
pub fn inspect(headers: &HeaderMap, origin: &str) -> ComplianceSignals {
    let allow_origin = header_str(headers, ACCESS_CONTROL_ALLOW_ORIGIN);
    let content_type = header_str(headers, CONTENT_TYPE);

    ComplianceSignals {
        cors: matches!(allow_origin, Some(value) if value == "*" || value == origin),
        content_type_ok: content_type.is_some_and(|value| value.starts_with(JSON_MEDIA_TYPE)),
    }
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
