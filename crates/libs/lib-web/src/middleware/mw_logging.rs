//! # Request/Response Logging Middleware
//!
//! Structured logging for every HTTP request and response, correlated by the
//! request id from [`RequestStamp`](super::RequestStamp).
//!
//! Credentials never reach the log: sensitive headers are redacted, and so is
//! the `token` query parameter the chat socket handshake carries.

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use percent_encoding::percent_decode_str;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::mw_req_stamp::RequestStamp;

/// Sensitive headers that should not be logged
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "x-api-key",
    "x-auth-token",
    "sec-websocket-key",
];

/// Query parameters whose values are replaced before logging
const SENSITIVE_QUERY_PARAMS: &[&str] = &["token", "access_token"];

const REDACTED: &str = "***REDACTED***";

fn is_sensitive_param(raw_key: &str) -> bool {
    let key = percent_decode_str(raw_key).decode_utf8_lossy();
    SENSITIVE_QUERY_PARAMS.iter().any(|p| key.eq_ignore_ascii_case(p))
}

/// Replace the value of every sensitive query parameter.
///
/// Keys are compared after percent-decoding, so `%74oken` counts as `token`.
fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_param(key) => format!("{key}={REDACTED}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Request/response logging middleware.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(redact_query);

    let request_id = req
        .extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            if SENSITIVE_HEADERS.iter().any(|h| name_lower.contains(h)) {
                Some((name.to_string(), REDACTED.to_string()))
            } else {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect();

    let is_upgrade = req
        .headers()
        .get("upgrade")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"));

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        is_upgrade,
        "[REQUEST] {} {}{}",
        method,
        path,
        query.as_ref().map(|q| format!("?{}", q)).unwrap_or_default()
    );

    debug!(request_id = %request_id, headers = ?headers, "[REQUEST HEADERS]");

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();
    let status_code = status.as_u16();

    if status.is_server_error() {
        error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms) [SERVER ERROR]",
            method,
            path,
            status_code,
            duration.as_millis()
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms) [CLIENT ERROR]",
            method,
            path,
            status_code,
            duration.as_millis()
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms)",
            method,
            path,
            status_code,
            duration.as_millis()
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_token_param() {
        assert_eq!(redact_query("token=abc.def.ghi"), "token=***REDACTED***");
        assert_eq!(redact_query("a=1&token=secret&b=2"), "a=1&token=***REDACTED***&b=2");
    }

    #[test]
    fn test_redact_percent_encoded_key() {
        assert_eq!(redact_query("%74oken=abc.def"), "%74oken=***REDACTED***");
        assert_eq!(redact_query("access%5Ftoken=xyz&x=1"), "access%5Ftoken=***REDACTED***&x=1");
        assert_eq!(redact_query("Token=abc"), "Token=***REDACTED***");
    }

    #[test]
    fn test_other_params_untouched() {
        assert_eq!(redact_query("page=2&tokens=5"), "page=2&tokens=5");
        assert_eq!(redact_query("flag"), "flag");
    }
}
