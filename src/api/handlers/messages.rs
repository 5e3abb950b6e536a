use axum::Json;
use axum::extract::State;

use crate::api::AppState;
use crate::api::error::JsonBody;
use crate::api::extract::Authenticated;
use crate::error::BoardError;
use crate::models::Message;
use crate::policy::{Action, authorize};
use crate::services::messages::MessageForm;

pub async fn send_message(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    body: Result<JsonBody<MessageForm>, BoardError>,
) -> Result<Json<Message>, BoardError> {
    authorize(Some(&claims), Action::SendMessage)?;
    let JsonBody(form) = body?;
    Ok(Json(state.messages.send(&claims.username, &form).await?))
}

pub async fn inbox(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Vec<Message>>, BoardError> {
    authorize(Some(&claims), Action::ReadMessages)?;
    Ok(Json(state.messages.inbox(&claims.username).await?))
}

pub async fn outbox(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Vec<Message>>, BoardError> {
    authorize(Some(&claims), Action::ReadMessages)?;
    Ok(Json(state.messages.outbox(&claims.username).await?))
}
