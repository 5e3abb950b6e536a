#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use ideaboard::config::Config;
use ideaboard::{AppState, auth, build_router, storage};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN: &str = "root";
pub const PASSWORD: &str = "password1";
pub const DEFAULT_ORIGIN: &str = "10.0.0.1";

/// An in-memory board wired exactly like the server, driven without a socket.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_banned_words("").await
    }

    pub async fn with_banned_words(words: &str) -> Self {
        Self::build(words, true).await
    }

    /// Client addresses come from the socket only.
    pub async fn without_proxy() -> Self {
        Self::build("", false).await
    }

    async fn build(words: &str, trust_proxy: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let banned = dir.path().join("banned_words.txt");
        std::fs::write(&banned, words).unwrap();
        let cfg_text = format!(
            r#"
addr = "127.0.0.1:0"
jwt_secret = "integration-secret"
seed_admin = "{ADMIN}"
banned_words_path = '{}'
upload_dir = '{}'
max_upload_bytes = "1K"
trust_proxy = {trust_proxy}
"#,
            banned.display(),
            dir.path().join("uploads").display(),
        );
        let cfg = Config::from_toml(&cfg_text).unwrap();
        let storage = storage::open("sqlite::memory:").await.unwrap();
        let auth = auth::open("sqlite::memory:").await.unwrap();
        let state = AppState::new(&cfg, storage, auth).unwrap();
        let router = build_router(state.clone());
        Self { router, state, dir }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn call_from(
        &self,
        origin: &str,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", origin);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.call_from(DEFAULT_ORIGIN, method, uri, token, body).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    /// Register `username` and return its token.
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register {username}: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn login(&self, username: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/login",
            None,
            json!({ "username": username, "password": PASSWORD }),
        )
        .await
    }

    /// Register the seed admin and log in, which grants the admin role.
    pub async fn admin_token(&self) -> String {
        self.register(ADMIN).await;
        let (status, body) = self.login(ADMIN).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "admin");
        body["token"].as_str().unwrap().to_string()
    }

    /// Create an idea as `token` and return its id.
    pub async fn create_idea(&self, token: &str, body: Value) -> i64 {
        let (status, idea) = self.post("/api/ideas", Some(token), body).await;
        assert_eq!(status, StatusCode::OK, "create idea: {idea}");
        idea["id"].as_i64().unwrap()
    }
}
