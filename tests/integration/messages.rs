use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn messages_reach_inbox_and_outbox() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let (status, sent) = app
        .post(
            "/api/messages",
            Some(&alice),
            json!({ "to_username": "bob", "content": "hello bob" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["from_username"], "alice");
    assert_eq!(sent["to_username"], "bob");
    assert!(sent["id"].is_i64());

    let (status, inbox) = app.get("/api/messages/inbox", Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["content"], "hello bob");

    let (_, outbox) = app.get("/api/messages/outbox", Some(&alice)).await;
    assert_eq!(outbox.as_array().unwrap().len(), 1);
    let (_, empty) = app.get("/api/messages/inbox", Some(&alice)).await;
    assert!(empty.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn messages_need_token_and_fields() {
    let app = TestApp::new().await;
    let (status, _) = app.get("/api/messages/inbox", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let alice = app.register("alice").await;
    let (status, _) = app
        .post("/api/messages", Some(&alice), json!({ "to_username": "bob" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post("/api/messages", Some(&alice), json!({ "content": "to nobody" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blocked_user_cannot_create_anything() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let alice = app.register("alice").await;
    let id = app
        .create_idea(&alice, json!({ "title": "Before", "content": "C" }))
        .await;

    let (status, body) = app
        .post("/api/admin/users/alice/block", Some(&admin), json!({ "blocked": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocked"], true);

    // The old token predates the block; refresh it.
    let (status, me) = app.get("/api/auth/me", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["blocked"], true);
    let blocked = me["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .post("/api/ideas", Some(&blocked), json!({ "title": "T", "content": "C" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(&format!("/api/ideas/{id}/comments"), Some(&blocked), json!({ "content": "c" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(
            "/api/messages",
            Some(&blocked),
            json!({ "to_username": "root", "content": "let me in" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Refused even when the payload itself is invalid.
    let (status, _) = app.post("/api/ideas", Some(&blocked), json!(42)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reading and favoriting still work.
    let (status, _) = app.get("/api/messages/inbox", Some(&blocked)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call(
            axum::http::Method::POST,
            &format!("/api/ideas/{id}/favorite"),
            Some(&blocked),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // A blocked account cannot log in.
    let (status, _) = app.login("alice").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
