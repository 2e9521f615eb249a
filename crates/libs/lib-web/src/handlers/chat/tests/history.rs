use super::*;
use crate::chat::{ConnectionSession, Identity, OutboundEvent};
use serde_json::json;

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/chat/list", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "Authentication");

    let (status, _) = app.call("GET", "/api/chat/unread-count", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_send_persists_and_returns_created() {
    let app = TestApp::new().await;
    let token = app.token_for(&app.alice);

    let (status, body) = app
        .call(
            "POST",
            "/api/chat/send",
            Some(&token),
            Some(json!({ "receiverId": app.bob.id, "content": "hello bob" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"]["content"], "hello bob");
    assert_eq!(body["message"]["sender"]["id"], app.alice.id);
    assert_eq!(body["message"]["receiver"]["username"], "bob");
    assert_eq!(body["message"]["seen"], false);

    let stored = app
        .state
        .router
        .store()
        .find_conversation(app.alice.id, app.bob.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_send_reaches_live_receiver() {
    let app = TestApp::new().await;
    let (_session, mut rx) = ConnectionSession::open(Identity::from(&app.bob), &app.state.registry).await;

    let (status, _) = app
        .call(
            "POST",
            "/api/chat/send",
            Some(&app.token_for(&app.alice)),
            Some(json!({ "receiverId": app.bob.id, "content": "over rest" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    match rx.try_recv() {
        Ok(OutboundEvent::ReceiveMessage(p)) => assert_eq!(p.message.content, "over rest"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_send_validation_errors() {
    let app = TestApp::new().await;
    let token = app.token_for(&app.alice);

    let (status, body) = app
        .call("POST", "/api/chat/send", Some(&token), Some(json!({ "receiverId": app.bob.id, "content": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "Validation");

    let (status, _) = app
        .call("POST", "/api/chat/send", Some(&token), Some(json!({ "receiverId": 9999, "content": "hi" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            "POST",
            "/api/chat/send",
            Some(&token),
            Some(json!({ "receiverId": app.bob.id, "content": "x".repeat(101) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_input_gets_structured_error() {
    let app = TestApp::new().await;
    let token = app.token_for(&app.alice);

    let (status, body) = app
        .call("POST", "/api/chat/send", Some(&token), Some(json!({ "receiverId": "abc", "content": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "Validation");
    assert!(body["error"].is_string());

    let (status, body) = app.call("GET", "/api/chat/messages/notanumber", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "Validation");

    let (status, body) = app.call("PUT", "/api/chat/read/notanumber", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "Validation");

    let stored = app.state.router.store().unread_count_for(app.bob.id).await.unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_conversation_list_and_read_flow() {
    let app = TestApp::new().await;
    let store = app.state.router.store().clone();
    store.persist(app.alice.id, app.bob.id, Some("one"), None).await.unwrap();
    store.persist(app.alice.id, app.bob.id, Some("two"), None).await.unwrap();
    store.persist(app.bob.id, app.alice.id, Some("three"), None).await.unwrap();

    let bob_token = app.token_for(&app.bob);

    let (status, body) = app
        .call("GET", &format!("/api/chat/messages/{}", app.alice.id), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);

    let (_, body) = app.call("GET", "/api/chat/unread-count", Some(&bob_token), None).await;
    assert_eq!(body["count"], 2);

    let (status, body) = app.call("GET", "/api/chat/list", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body["chatList"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["partner"]["id"], app.alice.id);
    assert_eq!(list[0]["lastMessage"]["content"], "three");
    assert_eq!(list[0]["unreadCount"], 2);

    let (status, body) = app
        .call("PUT", &format!("/api/chat/read/{}", app.alice.id), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let (_, body) = app.call("GET", "/api/chat/unread-count", Some(&bob_token), None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_mark_all_read() {
    let app = TestApp::new().await;
    let store = app.state.router.store().clone();
    store.persist(app.bob.id, app.alice.id, Some("a"), None).await.unwrap();
    store.persist(app.bob.id, app.alice.id, Some("b"), None).await.unwrap();

    let token = app.token_for(&app.alice);
    let (status, body) = app.call("PUT", "/api/chat/mark-all-read", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);
    assert_eq!(store.unread_count_for(app.alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_users_excludes_caller() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/users", Some(&app.token_for(&app.alice)), None).await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "bob");
    assert!(users[0].get("email").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new().await;

    let (status, _) = app.call("GET", "/api/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
