//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The configuration is built once in the server bootstrap and handed to every
//! component that needs it through axum state; nothing reads it from a global.

use crate::error::{AppError, Result};
use lib_utils::{get_env, get_env_or, get_env_parse_or};

/// Default upper bound on the length of a chat message body, in characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 10_000;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// JWT token validity period in hours
    ///
    /// After this period, users must re-authenticate and reconnect.
    /// Valid range: 1-720 hours (1 hour to 30 days)
    pub jwt_expiration_hours: i64,

    /// Maximum chat message content length in characters
    pub max_message_length: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url = get_env_or("DATABASE_URL", "sqlite:data/hearth.db");

        let jwt_secret = get_env("JWT_SECRET")
            .map_err(|e| AppError::Config(e.to_string()))?;

        let jwt_expiration_hours = get_env_parse_or("JWT_EXPIRATION_HOURS", 168)
            .map_err(|e| AppError::Config(e.to_string()))?;

        let max_message_length = get_env_parse_or("MAX_MESSAGE_LENGTH", DEFAULT_MAX_MESSAGE_LENGTH)
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            max_message_length,
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < 32 {
            return Err(AppError::Config(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err(AppError::Config(
                "JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string(),
            ));
        }

        if self.max_message_length == 0 {
            return Err(AppError::Config(
                "MAX_MESSAGE_LENGTH must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
