//! # Core Library
//!
//! Configuration, errors, DTOs and the SQLite-backed stores for users and chat messages.

pub mod config;
pub mod error;
pub mod model;
pub mod dto;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{DbPool, UserId, create_pool, memory_pool, run_migrations};
pub use model::store::{MessageStore, UserRepository};
