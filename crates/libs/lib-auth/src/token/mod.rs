//! # JWT Token Management
//!
//! JWT token generation and validation. The subject claim carries the user id;
//! the username rides along so log lines can name the caller without a lookup.

use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims structure containing user authentication information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Parse the subject back into a numeric user id.
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse::<i64>()
            .map_err(|_| Error::TokenInvalid(format!("subject is not a user id: {}", self.sub)))
    }
}

/// Encode a JWT token with user claims.
pub fn encode_jwt(
    user_id: i64,
    username: String,
    secret: &str,
    expiration_hours: i64,
) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id.to_string(),
        username,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode_claims(&claims, secret)
}

/// Encode pre-built claims. Mostly useful for issuing tokens with a custom expiry.
pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::TokenEncode(e.to_string()))
}

/// Decode and validate a JWT token (signature and expiry).
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => Error::TokenExpired,
        _ => Error::TokenInvalid(e.to_string()),
    })?;

    Ok(token_data.claims)
}
