use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    for uri in ["/api/admin/users", "/api/admin/users/count", "/api/admin/banwords"] {
        let (status, _) = app.get(uri, Some(&alice)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        let (status, _) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
    let (status, _) = app
        .post("/api/admin/users/alice/block", Some(&alice), json!({ "blocked": true }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_count_and_status() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.register("alice").await;
    app.register("bob").await;

    let (status, count) = app.get("/api/admin/users/count", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["count"], 3);

    let (_, users) = app.get("/api/admin/users?limit=2", Some(&admin)).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "bob");
    assert!(users[0].get("password_hash").is_none());

    let (_, rest) = app
        .get("/api/admin/users?limit=junk&offset=2", Some(&admin))
        .await;
    assert_eq!(rest.as_array().unwrap().len(), 1);

    let (status, info) = app.get("/api/admin/users/root/status", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["role"], "admin");
    assert_eq!(info["blocked"], false);

    let (status, _) = app.get("/api/admin/users/ghost/status", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .post("/api/admin/users/ghost/block", Some(&admin), json!({ "blocked": true }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unblock_restores_login() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.register("alice").await;
    app.post("/api/admin/users/alice/block", Some(&admin), json!({ "blocked": true }))
        .await;
    assert_eq!(app.login("alice").await.0, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post("/api/admin/users/alice/block", Some(&admin), json!({ "blocked": false }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocked"], false);
    assert_eq!(app.login("alice").await.0, StatusCode::OK);
}

#[tokio::test]
async fn banwords_replace_takes_effect_immediately() {
    let app = TestApp::with_banned_words("spam\n").await;
    let admin = app.admin_token().await;
    let alice = app.register("alice").await;

    let (status, body) = app.get("/api/admin/banwords", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "spam\n");

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/admin/banwords",
            Some(&admin),
            Some(json!({ "content": "durian\n\n  (free)  \n" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["count"], 2);

    let (status, _) = app
        .post("/api/ideas", Some(&alice), json!({ "title": "spam", "content": "now allowed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post("/api/ideas", Some(&alice), json!({ "title": "Fruit", "content": "DURIAN pie" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post("/api/ideas", Some(&alice), json!({ "title": "Offer", "content": "get it (free)" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::PUT, "/api/admin/banwords", Some(&admin), Some(json!({ "content": 7 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .call(
            Method::PUT,
            "/api/admin/banwords",
            Some(&admin),
            Some(json!({ "content": "x".repeat(200_001) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let on_disk = std::fs::read_to_string(app.dir.path().join("banned_words.txt")).unwrap();
    assert!(on_disk.contains("durian"));
}
