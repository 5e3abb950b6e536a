//! Views scoped to one named user.

use axum::Json;
use axum::extract::{Path, State};

use crate::api::AppState;
use crate::api::extract::Authenticated;
use crate::error::BoardError;
use crate::models::{Idea, ReceivedComment};
use crate::policy::{Action, authorize};

/// Favorites are private to their owner.
pub async fn favorites(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(username): Path<String>,
) -> Result<Json<Vec<Idea>>, BoardError> {
    authorize(Some(&claims), Action::ListFavorites { owner: &username })?;
    Ok(Json(state.ideas.favorites(&username).await?))
}

pub async fn comments_received(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<ReceivedComment>>, BoardError> {
    Ok(Json(state.ideas.comments_received(&username).await?))
}
