//! # Authentication Library
//!
//! Password hashing and JWT token management.

pub mod error;
pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use error::{Error, Result};
pub use pwd::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
pub use token::{Claims, encode_claims, encode_jwt, decode_jwt};
