//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across the REST handlers and the real-time chat layer.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx)
//!    - [`Authentication`](AppError::Authentication) → 401 Unauthorized
//!    - [`Validation`](AppError::Validation) → 400 Bad Request
//!    - [`NotFound`](AppError::NotFound) → 404 Not Found
//!    - [`Conflict`](AppError::Conflict) → 409 Conflict
//!
//! 2. **Server Errors** (5xx)
//!    - [`Persistence`](AppError::Persistence) → 503 Service Unavailable
//!    - [`Config`](AppError::Config) → 500 Internal Server Error
//!    - [`Internal`](AppError::Internal) → 500 Internal Server Error
//!
//! Over HTTP an error becomes a JSON body `{"error": ..., "code": ...}`. Over the
//! chat socket the same [`AppError::user_message`] is carried by an `error` event
//! sent to the originating connection only.
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn check_body(content: &str) -> Result<()> {
//!     if content.trim().is_empty() {
//!         return Err(AppError::Validation("Content or image is required".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, malformed or expired credential, or the credential's user no longer exists.
    ///
    /// **HTTP Status**: 401 Unauthorized
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Malformed or semantically invalid input.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced user or record does not exist.
    ///
    /// **HTTP Status**: 404 Not Found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness conflict (duplicate email or username).
    ///
    /// **HTTP Status**: 409 Conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying store unavailable or failing.
    ///
    /// **HTTP Status**: 503 Service Unavailable
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error during startup or environment loading.
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (unexpected failures).
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For server-side errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Authentication(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Persistence(_) => "Storage temporarily unavailable, please retry".to_string(),
            AppError::Config(_) | AppError::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    /// Stable machine-readable code (the variant name).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "Authentication",
            AppError::Validation(_) => "Validation",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Persistence(_) => "Persistence",
            AppError::Config(_) => "Config",
            AppError::Internal(_) => "Internal",
        }
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Server error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let body = Json(json!({
            "error": self.user_message(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert `sqlx::Error` to `AppError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                AppError::Persistence(format!("Database error: {}", db_err.message()))
            }
            _ => AppError::Persistence(format!("Database error: {}", err)),
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Malformed JSON: {}", err))
    }
}

/// Request body that is not the expected JSON (bad syntax, wrong types, wrong content type).
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Path segment that does not parse into the route's parameter type.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
