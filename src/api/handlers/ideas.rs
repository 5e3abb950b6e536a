//! Idea listing, authoring, likes and favorites.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::AppState;
use crate::api::error::{IdPath, JsonBody};
use crate::api::extract::{Authenticated, Identity, Origin};
use crate::error::BoardError;
use crate::models::{FavoriteState, Idea, IdeaPatch, LikeState};
use crate::policy::{Action, authorize};
use crate::services::ideas::{IdeaForm, ListParams};

#[derive(Debug, Default, Deserialize)]
pub struct RankingParams {
    pub category: Option<String>,
}

pub async fn list_ideas(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Idea>>, BoardError> {
    Ok(Json(state.ideas.list(&params).await?))
}

pub async fn daily_ranking(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Json<Vec<Idea>>, BoardError> {
    Ok(Json(state.ideas.daily_ranking(params.category.as_deref()).await?))
}

pub async fn get_idea(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Idea>, BoardError> {
    Ok(Json(state.ideas.get(id).await?))
}

/// Permission is checked before the body is looked at, so a blocked account
/// is refused even when its payload is malformed.
pub async fn create_idea(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    body: Result<JsonBody<IdeaForm>, BoardError>,
) -> Result<Json<Idea>, BoardError> {
    authorize(Some(&claims), Action::CreateIdea)?;
    let JsonBody(form) = body?;
    Ok(Json(state.ideas.create(&form).await?))
}

pub async fn update_idea(
    State(state): State<AppState>,
    Identity(claims): Identity,
    IdPath(id): IdPath,
    body: Result<JsonBody<IdeaPatch>, BoardError>,
) -> Result<Json<Idea>, BoardError> {
    authorize(claims.as_ref(), Action::UpdateIdea)?;
    let JsonBody(patch) = body?;
    let idea = state.ideas.update(id, &patch).await?;
    tracing::info!(id, "updated idea");
    Ok(Json(idea))
}

pub async fn delete_idea(
    State(state): State<AppState>,
    Identity(claims): Identity,
    IdPath(id): IdPath,
) -> Result<Json<Value>, BoardError> {
    authorize(claims.as_ref(), Action::DeleteIdea)?;
    state.ideas.delete(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Origin(origin): Origin,
    IdPath(id): IdPath,
) -> Result<Json<LikeState>, BoardError> {
    authorize(None, Action::Like)?;
    Ok(Json(state.ideas.toggle_like(id, &origin).await?))
}

pub async fn like_status(
    State(state): State<AppState>,
    Origin(origin): Origin,
    IdPath(id): IdPath,
) -> Result<Json<LikeState>, BoardError> {
    Ok(Json(state.ideas.like_status(id, &origin).await?))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    IdPath(id): IdPath,
) -> Result<Json<FavoriteState>, BoardError> {
    authorize(Some(&claims), Action::Favorite)?;
    Ok(Json(state.ideas.toggle_favorite(id, &claims.username).await?))
}

pub async fn favorite_status(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    IdPath(id): IdPath,
) -> Result<Json<FavoriteState>, BoardError> {
    authorize(Some(&claims), Action::Favorite)?;
    Ok(Json(state.ideas.favorite_status(id, &claims.username).await?))
}
