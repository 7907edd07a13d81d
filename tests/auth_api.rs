mod common;

use axum::http::{Method, StatusCode};
use common::{login, send, signup, test_app, token_for};
use stakeboard::{
    auth::{repo_types::User, JwtKeys},
    config::AppConfig,
};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

fn test_keys() -> JwtKeys {
    JwtKeys::from_config(&AppConfig::for_tests().jwt)
}

fn detached_user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "ghost@x.com".into(),
        username: "ghost".into(),
        password_hash: String::new(),
        created_at: OffsetDateTime::now_utc(),
    }
}

#[tokio::test]
async fn signup_returns_token_and_username() {
    let app = test_app();
    let (status, body) = signup(&app, "a@x.com", "a", "pw123456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], "a");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn signup_then_protected_call_with_and_without_token() {
    let app = test_app();
    let (status, body) = signup(&app, "a@x.com", "a", "pw123456").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/staking/overview", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, Method::GET, "/api/staking/overview", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing or invalid authorization header");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = test_app();
    let (status, _) = signup(&app, "a@x.com", "a", "pw123456").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = signup(&app, "a@x.com", "someone-else", "different-pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn login_with_correct_credentials_returns_working_token() {
    let app = test_app();
    signup(&app, "a@x.com", "a", "pw123456").await;

    let (status, body) = login(&app, "a@x.com", "pw123456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], "a");
    let token = body["token"].as_str().unwrap().to_string();

    let identity = test_keys().validate(&token).expect("token validates");
    assert_eq!(identity.email, "a@x.com");

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["username"], "a");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_is_invalid_credentials() {
    let app = test_app();
    signup(&app, "a@x.com", "a", "pw123456").await;

    let (status, body) = login(&app, "a@x.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = login(&app, "nobody@x.com", "pw123456").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = test_app();
    let token = test_keys()
        .issue_at(&detached_user(), OffsetDateTime::now_utc() - Duration::days(8))
        .unwrap();

    let (status, body) = send(&app, Method::GET, "/api/staking/assets", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let app = test_app();
    let token = token_for(&app, "a@x.com").await;
    let (head, sig) = token.rsplit_once('.').unwrap();
    let flipped = if sig.starts_with('A') { "B" } else { "A" };
    let tampered = format!("{}.{}{}", head, flipped, &sig[1..]);

    let (status, body) = send(&app, Method::GET, "/api/staking/assets", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn non_bearer_header_is_unauthorized() {
    let app = test_app();
    let request = axum::http::Request::builder()
        .uri("/api/auth/me")
        .header("Authorization", "Basic dXNlcjpwdw==")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_bodies_get_structured_errors() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(serde_json::json!({ "email": "a@x.com", "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": "a@x.com", "password": "pw", "admin": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn signup_validates_fields() {
    let app = test_app();
    let (status, body) = signup(&app, "not-an-email", "a", "pw123456").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email");

    let (status, body) = signup(&app, "a@x.com", "a", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password too short");
}

#[tokio::test]
async fn overlong_passwords_cannot_sign_up_or_log_in() {
    let app = test_app();
    let prefix = "a".repeat(72);
    let (status, _) = signup(&app, "a@x.com", "a", &format!("{}correct-suffix", prefix)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    signup(&app, "a@x.com", "a", &prefix).await;
    let (status, body) = login(&app, "a@x.com", &format!("{}totally-wrong", prefix)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::Value::String("ok".into()));
}
