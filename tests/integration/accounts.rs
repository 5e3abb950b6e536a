use axum::http::StatusCode;
use serde_json::json;

use crate::common::{PASSWORD, TestApp};

#[tokio::test]
async fn register_returns_user_and_token() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "alice", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["blocked"], false);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_validates_input() {
    let app = TestApp::new().await;
    let short = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "ab", "password": PASSWORD }),
        )
        .await;
    assert_eq!(short.0, StatusCode::BAD_REQUEST);
    assert!(short.1["error"].is_string());

    let weak = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "alice", "password": "12345" }),
        )
        .await;
    assert_eq!(weak.0, StatusCode::BAD_REQUEST);

    let missing = app.post("/api/auth/register", None, json!({})).await;
    assert_eq!(missing.0, StatusCode::BAD_REQUEST);

    let garbage = app
        .call(
            axum::http::Method::POST,
            "/api/auth/register",
            None,
            Some(json!("not an object")),
        )
        .await;
    assert_eq!(garbage.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.register("alice").await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "alice", "password": "another-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_checks_password() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let (status, body) = app.login("alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "alice", "password": "wrong-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/api/auth/login", None, json!({ "username": "alice" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_requires_a_valid_token() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;

    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["token"].is_string());

    let (status, _) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/api/auth/me", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seed_admin_is_promoted_on_login() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
}
