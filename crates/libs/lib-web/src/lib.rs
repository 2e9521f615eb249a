//! # Web Library
//!
//! HTTP handlers, middleware, the real-time chat subsystem, and server setup.

pub mod chat;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{create_router, start_server, AppState, ServerConfig};
