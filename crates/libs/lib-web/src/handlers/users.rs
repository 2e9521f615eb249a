//! # User Directory Handlers
//!
//! - `GET /api/users` - everyone except the caller, as chat projections

use axum::extract::{Extension, Json, State};
use lib_core::dto::UserProjection;
use lib_core::{DbPool, Result, UserRepository};

use crate::chat::Identity;

/// List the users the caller can start a conversation with.
pub async fn list_users(
    State(pool): State<DbPool>,
    Extension(me): Extension<Identity>,
) -> Result<Json<Vec<UserProjection>>> {
    let users = UserRepository::list_except(&pool, me.user_id).await?;

    Ok(Json(users.iter().map(|u| u.projection()).collect()))
}
