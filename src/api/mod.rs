//! HTTP surface: shared state, routing and the JSON handlers.

pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::DynAuth;
use crate::auth::token::TokenSigner;
use crate::config::Config;
use crate::error::{BoardError, ConfigError};
use crate::filters::BannedWords;
use crate::filters::factory::{FilterDeps, create_filter_chain};
use crate::media::LocalImageStorage;
use crate::services::{Accounts, Ideas, Messages};
use crate::storage::DynStorage;

pub use error::api_error;

/// Multipart framing allowance on top of the image size cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<Accounts>,
    pub ideas: Arc<Ideas>,
    pub messages: Arc<Messages>,
    pub banned_words: Arc<BannedWords>,
    pub images: LocalImageStorage,
    pub trust_proxy: bool,
}

impl AppState {
    /// Wire services over opened backends according to `cfg`.
    pub fn new(cfg: &Config, storage: DynStorage, auth: DynAuth) -> Result<Self, BoardError> {
        let signer = match cfg.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => TokenSigner::new(secret.as_bytes(), cfg.token_ttl_days),
            None => {
                tracing::warn!("jwt_secret not set, using a random secret; tokens will not survive a restart");
                TokenSigner::ephemeral(cfg.token_ttl_days)
            }
        };

        let banned_words = Arc::new(BannedWords::load(&cfg.banned_words_path));
        let deps = FilterDeps {
            banned_words: banned_words.clone(),
            max_text_bytes: cfg.max_text_bytes,
        };
        let filters = create_filter_chain(&cfg.filters, &deps)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        tracing::info!(filters = ?filters.filter_names(), "content filters ready");

        Ok(Self {
            accounts: Arc::new(Accounts::new(auth, signer, cfg.seed_admin.clone())),
            ideas: Arc::new(Ideas::new(storage.clone(), filters)),
            messages: Arc::new(Messages::new(storage)),
            banned_words,
            images: LocalImageStorage::new(&cfg.upload_dir, &cfg.upload_url_prefix, cfg.upload_limit()),
            trust_proxy: cfg.trust_proxy,
        })
    }
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let upload_limit = usize::try_from(state.images.max_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        // Accounts
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        // Ideas
        .route(
            "/ideas",
            get(handlers::ideas::list_ideas).post(handlers::ideas::create_idea),
        )
        .route("/ideas/daily-ranking", get(handlers::ideas::daily_ranking))
        .route(
            "/ideas/:id",
            get(handlers::ideas::get_idea)
                .put(handlers::ideas::update_idea)
                .delete(handlers::ideas::delete_idea),
        )
        .route("/ideas/:id/like", post(handlers::ideas::toggle_like))
        .route("/ideas/:id/like-status", get(handlers::ideas::like_status))
        .route("/ideas/:id/favorite", post(handlers::ideas::toggle_favorite))
        .route("/ideas/:id/favorite-status", get(handlers::ideas::favorite_status))
        // Comments
        .route(
            "/ideas/:id/comments",
            get(handlers::comments::list_comments).post(handlers::comments::add_comment),
        )
        .route("/comments/:id", delete(handlers::comments::delete_comment))
        // Uploads
        .route(
            "/upload",
            post(handlers::upload::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Per-user views
        .route("/users/:username/favorites", get(handlers::users::favorites))
        .route(
            "/users/:username/comments-received",
            get(handlers::users::comments_received),
        )
        // Messages
        .route("/messages", post(handlers::messages::send_message))
        .route("/messages/inbox", get(handlers::messages::inbox))
        .route("/messages/outbox", get(handlers::messages::outbox))
        // Administration
        .route(
            "/admin/banwords",
            get(handlers::admin::get_banwords).put(handlers::admin::put_banwords),
        )
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/count", get(handlers::admin::count_users))
        .route("/admin/users/:username/status", get(handlers::admin::user_status))
        .route("/admin/users/:username/block", post(handlers::admin::set_blocked))
        .fallback(|| async { api_error(StatusCode::NOT_FOUND, "api route not found") })
}

/// Build the complete router: the JSON API under `/api` plus uploaded files.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().nest("/api", api_routes(&state));

    let prefix = state.images.url_prefix();
    if prefix.starts_with('/') && prefix.len() > 1 && prefix != "/api" {
        router = router.nest_service(prefix, ServeDir::new(state.images.upload_dir()));
    }

    router
        .fallback(|| async { (StatusCode::NOT_FOUND, "not found") })
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
