//! # Chat Handler Tests
//!
//! Exercised through the full application router so the auth layer, the
//! route table and the error mapping are covered together.

mod history;
mod socket;

use crate::server::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_auth::encode_jwt;
use lib_core::model::store::User;
use lib_core::{memory_pool, Config, UserRepository};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "chat-test-secret-key-at-least-32-characters!";

pub struct TestApp {
    pub state: AppState,
    pub alice: User,
    pub bob: User,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = memory_pool().await.expect("Failed to create test database");
        let alice = UserRepository::create(&pool, "alice", "alice@example.com", "hash", "")
            .await
            .unwrap();
        let bob = UserRepository::create(&pool, "bob", "bob@example.com", "hash", "")
            .await
            .unwrap();

        Self { state: AppState::new(pool, test_config()), alice, bob }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), vec![])
    }

    pub fn token_for(&self, user: &User) -> String {
        encode_jwt(user.id, user.username.clone(), TEST_SECRET, 1).unwrap()
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty or not JSON)
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration_hours: 1,
        max_message_length: 100,
    }
}
