//! # Request Stamping Middleware
//!
//! Adds request metadata (ID, timestamp) to requests for tracing and debugging.
//!
//! A client-supplied `X-Request-ID` is kept when it looks sane, so a web client
//! can correlate its own logs with ours; otherwise a fresh UUID is generated.
//! The id is echoed back in the response headers either way.
//!
//! Request ID is available in handlers via `Extension<RequestStamp>`:
//!
//! ```rust,ignore
//! use axum::extract::Extension;
//! use lib_web::middleware::RequestStamp;
//!
//! async fn handler(Extension(stamp): Extension<RequestStamp>) -> String {
//!     format!("Request ID: {}", stamp.id)
//! }
//! ```

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

const MAX_REQUEST_ID_LEN: usize = 64;

/// Request metadata for tracing and debugging.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    /// Unique request identifier
    pub id: String,
    /// Time the request entered the stack
    pub received_at: DateTime<Utc>,
}

impl RequestStamp {
    fn from_headers(headers: &HeaderMap) -> Self {
        let id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_acceptable_id(v))
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self { id, received_at: Utc::now() }
    }
}

fn is_acceptable_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Request stamping middleware.
///
/// Adds the [`RequestStamp`] to request extensions and `X-Request-ID` to the response.
pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp::from_headers(req.headers());

    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    res
}
