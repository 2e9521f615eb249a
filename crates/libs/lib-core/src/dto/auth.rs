//! # Authentication Data Transfer Objects
//!
//! Request and response structures for the account endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/auth/register` - [`RegisterRequest`] -> [`AuthResponse`]
//! - `POST /api/auth/login` - [`LoginRequest`] -> [`AuthResponse`]
//! - `GET /api/auth/me` - [`UserInfo`]
//!
//! ## Wire Format
//!
//! Field names are **snake_case** (default serde behavior). Failures use
//! [`ErrorResponse`].
//!
//! ```text
//! POST /api/auth/login
//! Content-Type: application/json
//!
//! {
//!   "email_or_username": "alice",
//!   "password": "MyPassword123!"
//! }
//! ```
//!
//! Response:
//! ```text
//! {
//!   "user": {
//!     "id": 1,
//!     "username": "alice",
//!     "email": "alice@example.com",
//!     "avatar": "",
//!     "created_at": "2025-01-01T00:00:00+00:00"
//!   },
//!   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
//!   "message": "Login successful"
//! }
//! ```

use lib_utils::format_time;
use serde::{Deserialize, Serialize};

use crate::model::store::User;

/// Login request with email or username.
///
/// Password is sent in plaintext over HTTPS and verified against the Argon2 hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email_or_username: String,
    pub password: String,
}

/// Registration request for a new account.
///
/// # Validation Rules (Server-Side)
///
/// - Username must be at least 3 characters
/// - Email must be a valid address and not already registered
/// - Password must be at least 8 characters
/// - Avatar is an optional image URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Authentication response returned on successful login or registration.
///
/// The `token` is presented as `Authorization: Bearer <token>` on REST calls and
/// as the `token` query parameter on the chat socket handshake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
    pub message: String,
}

/// User information (public, safe to send to client).
///
/// Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: String,
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            created_at: format_time(user.created_at),
        }
    }
}

/// Standard error body for the account endpoints.
///
/// ```json
/// {
///   "error": "Invalid email or password"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}
