//! # HTTP Request Handlers
//!
//! Axum handlers organized by feature domain.
//!
//! ## Handler Modules
//!
//! - **[`auth`]**: account endpoints
//!   - `POST /api/auth/register` - Create new user account
//!   - `POST /api/auth/login` - Authenticate with email/username and password
//!   - `GET /api/auth/me` - Current user profile
//!
//! - **[`users`]**: user directory
//!   - `GET /api/users` - Users the caller can message
//!
//! - **[`chat`]**: chat history, unread counts, REST send/read fallback
//!
//! - **[`websocket`]**: real-time chat socket
//!   - `GET /api/ws/chat?token=<jwt>`
//!
//! ## Authentication
//!
//! Protected endpoints extract `Extension<Identity>`, injected by
//! [`require_auth`](crate::middleware::require_auth).
//!
//! ## Error Handling
//!
//! Account handlers answer `(StatusCode, Json<ErrorResponse>)`. Everything else
//! returns `lib_core::Result<T>` and lets `AppError` render `{"error", "code"}`.

pub mod auth;
pub mod chat;
pub mod users;
pub mod websocket;
