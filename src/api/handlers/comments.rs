use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::api::AppState;
use crate::api::error::{IdPath, JsonBody};
use crate::api::extract::{Authenticated, Identity};
use crate::error::BoardError;
use crate::models::Comment;
use crate::policy::{Action, authorize};
use crate::services::ideas::CommentForm;

pub async fn list_comments(
    State(state): State<AppState>,
    IdPath(idea_id): IdPath,
) -> Result<Json<Vec<Comment>>, BoardError> {
    Ok(Json(state.ideas.comments(idea_id).await?))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    IdPath(idea_id): IdPath,
    body: Result<JsonBody<CommentForm>, BoardError>,
) -> Result<Json<Comment>, BoardError> {
    authorize(Some(&claims), Action::CreateComment)?;
    let JsonBody(form) = body?;
    let comment = state
        .ideas
        .add_comment(idea_id, &form, Some(&claims.username))
        .await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Identity(claims): Identity,
    IdPath(id): IdPath,
) -> Result<Json<Value>, BoardError> {
    authorize(claims.as_ref(), Action::DeleteComment)?;
    state.ideas.delete_comment(id).await?;
    Ok(Json(json!({ "deleted": true })))
}
