use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn register_post_list_and_like() {
    let app = TestApp::new().await;
    app.register("alice").await;
    let (status, body) = app.login("alice").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let id = app
        .create_idea(&token, json!({ "title": "T", "content": "C" }))
        .await;

    let (status, ideas) = app.get("/api/ideas", None).await;
    assert_eq!(status, StatusCode::OK);
    let ideas = ideas.as_array().unwrap();
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0]["id"], id);
    assert_eq!(ideas[0]["likes_count"], 0);
    assert_eq!(ideas[0]["comments_count"], 0);
    assert_eq!(ideas[0]["author"], "anonymous");
    assert_eq!(ideas[0]["category"], "daydream");

    let (status, like) = app
        .call_from("192.0.2.7", Method::POST, &format!("/api/ideas/{id}/like"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(like["liked"], true);
    assert_eq!(like["likes"], 1);

    let (_, state) = app
        .call_from("192.0.2.7", Method::GET, &format!("/api/ideas/{id}/like-status"), None, None)
        .await;
    assert_eq!(state["liked"], true);
    assert_eq!(state["likes"], 1);

    let (_, other) = app
        .call_from("192.0.2.8", Method::GET, &format!("/api/ideas/{id}/like-status"), None, None)
        .await;
    assert_eq!(other["liked"], false);
}

#[tokio::test]
async fn liking_twice_restores_the_count() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;
    let id = app
        .create_idea(&token, json!({ "title": "T", "content": "C" }))
        .await;
    let uri = format!("/api/ideas/{id}/like");
    let (_, first) = app.call(Method::POST, &uri, None, None).await;
    let (_, second) = app.call(Method::POST, &uri, None, None).await;
    assert_eq!(first["liked"], true);
    assert_eq!(second["liked"], false);
    assert_eq!(second["likes"], 0);

    let (status, _) = app.call(Method::POST, "/api/ideas/9999/like", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_requires_login_and_fields() {
    let app = TestApp::new().await;
    let (status, _) = app
        .post("/api/ideas", None, json!({ "title": "T", "content": "C" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.register("alice").await;
    let (status, body) = app
        .post("/api/ideas", Some(&token), json!({ "title": "  ", "content": "C" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, idea) = app
        .post(
            "/api/ideas",
            Some(&token),
            json!({ "title": "T", "content": "C", "author": "alice", "category": "wish" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(idea["author"], "alice");
    assert_eq!(idea["category"], "wish");

    let (_, idea) = app
        .post(
            "/api/ideas",
            Some(&token),
            json!({ "title": "T2", "content": "C", "category": "gossip" }),
        )
        .await;
    assert_eq!(idea["category"], "daydream");
}

#[tokio::test]
async fn banned_words_block_ideas_and_comments() {
    let app = TestApp::with_banned_words("spam\n\n  scam  \n").await;
    let token = app.register("alice").await;

    let (status, _) = app
        .post(
            "/api/ideas",
            Some(&token),
            json!({ "title": "Great deal", "content": "totally not SPAM" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/ideas",
            Some(&token),
            json!({ "title": "Fine", "content": "fine", "author": "scammer" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = app
        .create_idea(&token, json!({ "title": "Fine", "content": "fine" }))
        .await;
    let (status, _) = app
        .post(
            &format!("/api/ideas/{id}/comments"),
            Some(&token),
            json!({ "content": "Spam here" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, ideas) = app.get("/api/ideas", None).await;
    assert_eq!(ideas.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn comments_update_counts_and_author_fallback() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = app
        .create_idea(&alice, json!({ "title": "Garden", "content": "C", "author": "alice" }))
        .await;

    let (status, comment) = app
        .post(&format!("/api/ideas/{id}/comments"), Some(&bob), json!({ "content": "nice" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["author"], "bob");
    assert_eq!(comment["idea_id"], id);

    let (_, comment) = app
        .post(
            &format!("/api/ideas/{id}/comments"),
            Some(&bob),
            json!({ "content": "again", "author": "B." }),
        )
        .await;
    assert_eq!(comment["author"], "B.");

    let (_, idea) = app.get(&format!("/api/ideas/{id}"), None).await;
    assert_eq!(idea["comments_count"], 2);

    let (_, comments) = app.get(&format!("/api/ideas/{id}/comments"), None).await;
    assert_eq!(comments[0]["content"], "again");

    let (_, received) = app.get("/api/users/alice/comments-received", None).await;
    let received = received.as_array().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0]["idea_title"], "Garden");

    let (status, _) = app
        .post("/api/ideas/9999/comments", Some(&bob), json!({ "content": "lost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/ideas/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, body) = app.get("/api/ideas/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn listing_filters_and_rejects_bad_input() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;
    app.create_idea(&token, json!({ "title": "A", "content": "C", "category": "wish", "author": "alice" }))
        .await;
    app.create_idea(&token, json!({ "title": "B", "content": "C", "category": "project" }))
        .await;

    let (_, wishes) = app.get("/api/ideas?category=wish", None).await;
    assert_eq!(wishes.as_array().unwrap().len(), 1);
    let (_, all) = app.get("/api/ideas?category=all&sort=latest", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["title"], "B");
    let (_, mine) = app.get("/api/ideas?author=alice", None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let (_, dated) = app.get(&format!("/api/ideas?date={today}"), None).await;
    assert_eq!(dated.as_array().unwrap().len(), 2);
    let (_, old) = app.get("/api/ideas?date=2001-01-01", None).await;
    assert!(old.as_array().unwrap().is_empty());

    let (status, _) = app.get("/api/ideas?category=gossip", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/ideas?date=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn daily_ranking_orders_by_hot_score() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;
    let quiet = app
        .create_idea(&token, json!({ "title": "Quiet", "content": "C" }))
        .await;
    let liked = app
        .create_idea(&token, json!({ "title": "Liked", "content": "C" }))
        .await;
    let _newest = app
        .create_idea(&token, json!({ "title": "Newest", "content": "C", "category": "wish" }))
        .await;
    app.call(Method::POST, &format!("/api/ideas/{liked}/like"), None, None)
        .await;

    let (status, ranking) = app.get("/api/ideas/daily-ranking", None).await;
    assert_eq!(status, StatusCode::OK);
    let ranking = ranking.as_array().unwrap();
    assert_eq!(ranking.len(), 3);
    assert_eq!(ranking[0]["id"], liked);
    assert_eq!(ranking[2]["id"], quiet);

    let (_, wishes) = app.get("/api/ideas/daily-ranking?category=wish", None).await;
    assert_eq!(wishes.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn favorites_are_private() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = app
        .create_idea(&alice, json!({ "title": "T", "content": "C" }))
        .await;

    let (status, _) = app
        .call(Method::POST, &format!("/api/ideas/{id}/favorite"), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, fav) = app
        .call(Method::POST, &format!("/api/ideas/{id}/favorite"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fav["favorited"], true);
    let (_, fav) = app
        .get(&format!("/api/ideas/{id}/favorite-status"), Some(&bob))
        .await;
    assert_eq!(fav["favorited"], true);

    let (status, list) = app.get("/api/users/bob/favorites", Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["id"], id);

    let (status, _) = app.get("/api/users/bob/favorites", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_admins_edit_and_delete() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let admin = app.admin_token().await;
    let id = app
        .create_idea(&alice, json!({ "title": "T", "content": "C", "image_url": "/uploads/x.png" }))
        .await;
    let uri = format!("/api/ideas/{id}");

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&alice), Some(json!({ "title": "Mine" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call(Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, idea) = app
        .call(
            Method::PUT,
            &uri,
            Some(&admin),
            Some(json!({ "title": "Edited", "image_url": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(idea["title"], "Edited");
    assert_eq!(idea["content"], "C");
    assert!(idea["image_url"].is_null());

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&admin), Some(json!({ "category": "gossip" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, comment) = app
        .post(&format!("{uri}/comments"), Some(&alice), json!({ "content": "c" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let comment_id = comment["id"].as_i64().unwrap();

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/comments/{comment_id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app
        .call(Method::DELETE, &format!("/api/comments/{comment_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
    let (_, idea) = app.get(&uri, None).await;
    assert_eq!(idea["comments_count"], 0);

    let (status, body) = app.call(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_api_route_is_json_404() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, body) = app.get("/not-api", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_string());
}
