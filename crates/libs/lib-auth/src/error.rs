//! # Authentication Errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Failed to encode JWT: {0}")]
    TokenEncode(String),

    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}
