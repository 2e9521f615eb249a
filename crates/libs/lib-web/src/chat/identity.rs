//! # Identity Verifier
//!
//! Resolves a bearer credential to the user it names. A credential is accepted
//! only when the token signature and expiry check out AND the user still exists.
//!
//! Used by the chat socket handshake (token from the query string) and by the
//! REST auth middleware (token from the `Authorization` header).

use std::sync::Arc;

use lib_auth::{decode_jwt, Error as AuthError};
use lib_core::dto::UserProjection;
use lib_core::model::store::User;
use lib_core::{AppError, Config, DbPool, Result, UserId, UserRepository};
use tracing::{debug, warn};

use super::presence::RoomKey;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub avatar: String,
}

impl Identity {
    pub fn projection(&self) -> UserProjection {
        UserProjection {
            id: self.user_id,
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }

    /// The room every connection of this user joins.
    pub fn room(&self) -> RoomKey {
        RoomKey::from(self.user_id)
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Clone)]
pub struct IdentityVerifier {
    secret: Arc<str>,
    pool: DbPool,
}

impl IdentityVerifier {
    pub fn new(secret: impl Into<Arc<str>>, pool: DbPool) -> Self {
        Self { secret: secret.into(), pool }
    }

    pub fn from_config(config: &Config, pool: DbPool) -> Self {
        Self::new(config.jwt_secret.as_str(), pool)
    }

    /// Verify `token` and load the user it was issued for.
    ///
    /// Every failure is an `AppError::Authentication`, except store failures
    /// during the user lookup which surface as `Persistence`.
    pub async fn verify(&self, token: Option<&str>) -> Result<Identity> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Authentication("Authentication required".to_string()))?;

        let claims = decode_jwt(token, &self.secret).map_err(|e| {
            warn!("[AUTH] Token rejected: {}", e);
            match e {
                AuthError::TokenExpired => AppError::Authentication("Token expired".to_string()),
                _ => AppError::Authentication("Invalid token".to_string()),
            }
        })?;

        let user_id = claims.user_id().map_err(|e| {
            warn!("[AUTH] Token rejected: {}", e);
            AppError::Authentication("Invalid token".to_string())
        })?;

        let user = UserRepository::find_by_id(&self.pool, user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                warn!(user_id, "[AUTH] Token subject no longer exists");
                AppError::Authentication("User not found".to_string())
            })?;

        debug!(user_id = user.id, username = %user.username, "[AUTH] Identity verified");
        Ok(Identity::from(&user))
    }
}
