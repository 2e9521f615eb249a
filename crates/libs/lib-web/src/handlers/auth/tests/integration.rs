//! # Integration Tests
//!
//! Register → login → authenticated profile lookup.

use super::*;
use lib_auth::decode_jwt;

#[tokio::test]
async fn test_register_then_login() {
    let pool = setup_test_db().await;
    let config = test_config();

    let (status, registered): (_, AuthResponse) = post_json(
        test_app(pool.clone(), config.clone()),
        "/register",
        &register_req("testuser", "test@example.com", "TestPassword123!"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, logged_in): (_, AuthResponse) = post_json(
        test_app(pool, config),
        "/login",
        &LoginRequest {
            email_or_username: "test@example.com".to_string(),
            password: "TestPassword123!".to_string(),
        },
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in.user.id, registered.user.id);
}

#[tokio::test]
async fn test_jwt_token_is_valid() {
    let config = test_config();
    let (_, auth): (_, AuthResponse) = post_json(
        test_app(setup_test_db().await, config.clone()),
        "/register",
        &register_req("tokenuser", "token@example.com", "TestPassword123!"),
    )
    .await;

    let claims = decode_jwt(&auth.token, &config.jwt_secret).unwrap();

    assert_eq!(claims.user_id().unwrap(), auth.user.id);
    assert_eq!(claims.username, "tokenuser");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = test_app(setup_test_db().await, test_config());

    let response = app
        .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let pool = setup_test_db().await;
    let config = test_config();
    let (_, auth): (_, AuthResponse) = post_json(
        test_app(pool.clone(), config.clone()),
        "/register",
        &register_req("meuser", "me@example.com", "TestPassword123!"),
    )
    .await;

    let response = test_app(pool, config)
        .oneshot(
            Request::builder()
                .uri("/me")
                .header("authorization", format!("Bearer {}", auth.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let info: UserInfo = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(info.username, "meuser");
}
