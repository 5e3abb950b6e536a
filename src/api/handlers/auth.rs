//! Registration, login and token refresh.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::api::AppState;
use crate::api::error::JsonBody;
use crate::api::extract::Authenticated;
use crate::error::BoardError;
use crate::policy::{Action, authorize};
use crate::services::accounts::Session;

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    fn parts(&self) -> (&str, &str) {
        (
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
    }
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<Json<Session>, BoardError> {
    let (username, password) = body.parts();
    let session = state.accounts.register(username, password).await?;
    Ok(Json(session))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<Json<Session>, BoardError> {
    let (username, password) = body.parts();
    let session = state.accounts.login(username, password).await?;
    tracing::info!(username = %session.user.username, "login");
    Ok(Json(session))
}

/// Reissue the caller's token with their current role and block flag.
pub async fn me(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Session>, BoardError> {
    authorize(Some(&claims), Action::WhoAmI)?;
    Ok(Json(state.accounts.who_am_i(&claims).await?))
}
