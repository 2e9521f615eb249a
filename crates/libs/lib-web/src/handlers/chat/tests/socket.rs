//! Handshake checks; event handling itself is covered in `chat::router`.

use super::*;

#[tokio::test]
async fn test_handshake_without_token_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/ws/chat", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn test_handshake_with_bad_token_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/ws/chat?token=garbage", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
    assert_eq!(app.state.registry.connection_count().await, 0);
}

#[tokio::test]
async fn test_valid_token_without_upgrade_is_not_auth_failure() {
    let app = TestApp::new().await;
    let uri = format!("/api/ws/chat?token={}", app.token_for(&app.alice));

    let (status, _) = app.call("GET", &uri, None, None).await;

    assert!(status.is_client_error());
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.state.registry.connection_count().await, 0);
}
