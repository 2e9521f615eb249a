//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures exchanged with the client over the
//! REST API and the chat socket.

pub mod auth;
pub mod chat;

pub use auth::*;
pub use chat::*;
