use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::api::{AppState, build_router};
use crate::auth;
use crate::config::Config;
use crate::filters::BannedWords;
use crate::storage;

fn listen_addr(raw: &str) -> String {
    if raw.parse::<SocketAddr>().is_ok() {
        raw.to_string()
    } else if let Some(port) = raw.strip_prefix(':') {
        format!("0.0.0.0:{port}")
    } else {
        format!("0.0.0.0:{raw}")
    }
}

/// URI for a configured database path; bare paths are taken as SQLite files.
pub fn database_uri(path: &str) -> String {
    if path.contains(':') && !path.starts_with('/') && !path.starts_with('.') {
        path.to_string()
    } else {
        format!("sqlite:{path}")
    }
}

#[cfg(unix)]
fn spawn_reload_on_hangup(words: Arc<BannedWords>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        match signal(SignalKind::hangup()) {
            Ok(mut hup) => {
                while hup.recv().await.is_some() {
                    let terms = words.reload();
                    info!(terms, "banned word list reloaded on SIGHUP");
                }
            }
            Err(e) => tracing::warn!("cannot install SIGHUP handler: {e}"),
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_words: Arc<BannedWords>) {}

/// Open both databases, build the router and serve until ctrl-c.
pub async fn run(cfg: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = storage::open(&database_uri(&cfg.db_path)).await?;
    let auth = auth::open(&database_uri(&cfg.auth_db_path)).await?;
    let state = AppState::new(&cfg, storage, auth)?;
    spawn_reload_on_hangup(state.banned_words.clone());

    tokio::fs::create_dir_all(&cfg.upload_dir).await?;
    let app = build_router(state);

    let addr = listen_addr(&cfg.addr);
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
        }
    })
    .await?;
    Ok(())
}
