//! # Authentication Middleware
//!
//! Axum middleware for bearer-token authentication.
//!
//! The token in `Authorization: Bearer <token>` is resolved through the same
//! [`IdentityVerifier`] the chat socket uses, so a token whose user no longer
//! exists is rejected here too. The resulting [`Identity`] is injected into the
//! request extensions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{Router, routing::get, middleware::from_fn_with_state};
//! use lib_web::middleware::require_auth;
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(from_fn_with_state(verifier, require_auth));
//! ```
//!
//! Handlers then extract the caller with `Extension<Identity>`:
//!
//! ```rust,ignore
//! use axum::extract::Extension;
//! use lib_web::chat::Identity;
//!
//! async fn protected_handler(Extension(me): Extension<Identity>) -> String {
//!     format!("Hello, {}!", me.username)
//! }
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_core::AppError;
use tracing::{debug, warn};

use crate::chat::IdentityVerifier;

/// Authentication middleware that validates bearer tokens.
///
/// # Behavior
///
/// - **Valid token, existing user**: continues with `Identity` in extensions
/// - **Missing header, wrong scheme, bad token, vanished user**: `401 Unauthorized`
pub async fn require_auth(
    State(verifier): State<IdentityVerifier>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    if token.is_none() {
        warn!("[AUTH] Missing or malformed Authorization header");
    }

    let identity = verifier.verify(token).await?;

    debug!("[AUTH] Authenticated user: {} (id: {})", identity.username, identity.user_id);

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
