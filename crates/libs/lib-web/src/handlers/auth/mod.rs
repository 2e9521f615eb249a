//! # Authentication Handlers
//!
//! HTTP request handlers for account endpoints.
//!
//! - `POST /api/auth/register` - create an account, returns a JWT
//! - `POST /api/auth/login` - email or username + password, returns a JWT
//! - `GET /api/auth/me` - the caller's profile (behind `require_auth`)
//!
//! The issued token is what the chat socket expects in its `token` query parameter.

use lib_auth::{encode_jwt, hash_password, verify_password, MIN_PASSWORD_LENGTH};
use lib_core::dto::{AuthResponse, ErrorResponse, LoginRequest, RegisterRequest, UserInfo};
use lib_core::model::store::User;
use lib_core::{Config, DbPool, UserRepository};
use lib_utils::{validate_email, validate_max_length, validate_min_length, validate_not_empty};
use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
};
use tracing::{debug, error, info, warn, instrument};

use crate::chat::Identity;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 30;

type AuthResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ErrorResponse>)>;

fn fail(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: error.into() }))
}

fn issue_token(user: &User, config: &Config) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    encode_jwt(user.id, user.username.clone(), &config.jwt_secret, config.jwt_expiration_hours)
        .map_err(|e| {
            error!("[AUTH] JWT encoding failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate token")
        })
}

/// Register handler - creates a new user account.
///
/// # Validation
///
/// - Username must be 3-30 characters and unique
/// - Email must be a valid address and unique
/// - Password must be at least 8 characters
///
/// # Returns
///
/// * `201 Created` with [`AuthResponse`]
/// * `400` on validation failure, `409` on duplicate email/username
#[instrument(skip(pool, config, req), fields(username = %req.username, email = %req.email))]
pub async fn register(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<AuthResponse> {
    info!("[REGISTER] New account request");

    let username = req.username.trim();
    let email = req.email.trim().to_lowercase();

    validate_not_empty(username, "Username")
        .and_then(|_| validate_min_length(username, USERNAME_MIN, "Username"))
        .and_then(|_| validate_max_length(username, USERNAME_MAX, "Username"))
        .and_then(|_| validate_email(&email))
        .and_then(|_| validate_min_length(&req.password, MIN_PASSWORD_LENGTH, "Password"))
        .map_err(|msg| {
            warn!("[REGISTER] Validation failed: {}", msg);
            fail(StatusCode::BAD_REQUEST, msg)
        })?;

    let db_error = |e: sqlx::Error| {
        error!("[REGISTER] Database error: {}", e);
        fail(StatusCode::SERVICE_UNAVAILABLE, "Database error")
    };

    if UserRepository::find_by_email(&pool, &email).await.map_err(db_error)?.is_some() {
        warn!("[REGISTER] Email already registered");
        return Err(fail(StatusCode::CONFLICT, "Email already registered"));
    }

    if UserRepository::find_by_username(&pool, username).await.map_err(db_error)?.is_some() {
        warn!("[REGISTER] Username already taken");
        return Err(fail(StatusCode::CONFLICT, "Username already taken"));
    }

    debug!("[REGISTER] Hashing password...");
    let password_hash = hash_password(&req.password).map_err(|e| {
        warn!("[REGISTER] Password hashing failed: {}", e);
        fail(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let avatar = req.avatar.as_deref().map(str::trim).unwrap_or_default();
    let user = UserRepository::create(&pool, username, &email, &password_hash, avatar)
        .await
        .map_err(|e| {
            error!("[REGISTER] Failed to create user: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user")
        })?;

    let token = issue_token(&user, &config)?;

    info!(user_id = user.id, "[REGISTER] Account created");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo::from(&user),
            token,
            message: "Registration successful".to_string(),
        }),
    ))
}

/// Login handler - authenticates an existing user.
///
/// Accepts either email (contains '@') or username. Inactive accounts get `403`.
#[instrument(skip(pool, config, req), fields(identifier = %req.email_or_username))]
pub async fn login(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<AuthResponse> {
    info!("[LOGIN] Login attempt");

    let identifier = req.email_or_username.trim();
    let lookup = if identifier.contains('@') {
        UserRepository::find_by_email(&pool, &identifier.to_lowercase()).await
    } else {
        UserRepository::find_by_username(&pool, identifier).await
    };

    let user = match lookup {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("[LOGIN] Unknown user");
            return Err(fail(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        Err(e) => {
            error!("[LOGIN] Database error: {}", e);
            return Err(fail(StatusCode::SERVICE_UNAVAILABLE, "Database error"));
        }
    };

    if !user.is_active {
        warn!(user_id = user.id, "[LOGIN] Account deactivated");
        return Err(fail(StatusCode::FORBIDDEN, "Account is deactivated"));
    }

    let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        error!("[LOGIN] Password verification error: {}", e);
        fail(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
    })?;

    if !is_valid {
        warn!(user_id = user.id, "[LOGIN] Invalid password");
        return Err(fail(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    if let Err(e) = UserRepository::update_last_login(&pool, user.id).await {
        warn!(user_id = user.id, "[LOGIN] Could not update last_login: {}", e);
    }

    let token = issue_token(&user, &config)?;

    info!(user_id = user.id, "[LOGIN] User authenticated");

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            user: UserInfo::from(&user),
            token,
            message: "Login successful".to_string(),
        }),
    ))
}

/// Current user profile.
pub async fn me(
    State(pool): State<DbPool>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<UserInfo> {
    match UserRepository::find_by_id(&pool, identity.user_id).await {
        Ok(Some(user)) => Ok((StatusCode::OK, Json(UserInfo::from(&user)))),
        Ok(None) => Err(fail(StatusCode::UNAUTHORIZED, "User not found")),
        Err(e) => {
            error!("[AUTH] Database error loading profile: {}", e);
            Err(fail(StatusCode::SERVICE_UNAVAILABLE, "Database error"))
        }
    }
}

#[cfg(test)]
mod tests;
