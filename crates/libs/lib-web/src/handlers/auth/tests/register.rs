//! # Register Tests

use super::*;

#[tokio::test]
async fn test_register_success() {
    let app = test_app(setup_test_db().await, test_config());
    let mut req = register_req("testuser", "Test@Example.com", "TestPassword123!");
    req.avatar = Some("https://cdn.example.com/t.png".to_string());

    let (status, auth): (_, AuthResponse) = post_json(app, "/register", &req).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(auth.user.username, "testuser");
    assert_eq!(auth.user.email, "test@example.com");
    assert_eq!(auth.user.avatar, "https://cdn.example.com/t.png");
    assert_eq!(auth.message, "Registration successful");
    assert!(!auth.token.is_empty());
}

#[tokio::test]
async fn test_register_username_too_short() {
    let app = test_app(setup_test_db().await, test_config());

    let (status, err): (_, ErrorResponse) =
        post_json(app, "/register", &register_req("ab", "test@example.com", "TestPassword123!")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error, "Username must be at least 3 characters");
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = test_app(setup_test_db().await, test_config());

    let (status, err): (_, ErrorResponse) =
        post_json(app, "/register", &register_req("testuser", "invalid-email", "TestPassword123!")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.error, "Invalid email format");
}

#[tokio::test]
async fn test_register_password_too_short() {
    let app = test_app(setup_test_db().await, test_config());

    let (status, err): (_, ErrorResponse) =
        post_json(app, "/register", &register_req("testuser", "test@example.com", "short")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err.error.contains("at least 8"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let pool = setup_test_db().await;
    UserRepository::create(&pool, "existing", "test@example.com", "hash", "").await.unwrap();
    let app = test_app(pool, test_config());

    let (status, err): (_, ErrorResponse) =
        post_json(app, "/register", &register_req("newuser", "test@example.com", "TestPassword123!")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err.error, "Email already registered");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let pool = setup_test_db().await;
    UserRepository::create(&pool, "testuser", "first@example.com", "hash", "").await.unwrap();
    let app = test_app(pool, test_config());

    let (status, err): (_, ErrorResponse) =
        post_json(app, "/register", &register_req("testuser", "second@example.com", "TestPassword123!")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err.error, "Username already taken");
}
