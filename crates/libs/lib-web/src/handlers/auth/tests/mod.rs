//! # Auth Handler Tests
//!
//! Test suite for account handlers (register, login, me).

mod register;
mod integration;

use super::*;
use crate::middleware::require_auth;
use crate::server::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use lib_core::memory_pool;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-must-be-at-least-32-characters-long!";

/// In-memory database with migrations applied
pub async fn setup_test_db() -> DbPool {
    memory_pool().await.expect("Failed to create test database")
}

/// Create test config
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration_hours: 24,
        max_message_length: 10_000,
    }
}

/// Create test app with the account routes
pub fn test_app(pool: DbPool, config: Config) -> Router {
    let state = AppState::new(pool, config);

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/me",
            get(me).route_layer(from_fn_with_state(state.verifier.clone(), require_auth)),
        )
        .with_state(state)
}

/// POST a JSON body and decode the JSON response
pub async fn post_json<B: Serialize, R: DeserializeOwned>(app: Router, uri: &str, body: &B) -> (StatusCode, R) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        avatar: None,
    }
}
