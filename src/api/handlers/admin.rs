//! Administrator endpoints: banned word list and account moderation.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::AppState;
use crate::api::error::JsonBody;
use crate::api::extract::Identity;
use crate::error::{BoardError, ValidationError};
use crate::filters::banned::ReplaceError;
use crate::policy::{Action, authorize};
use crate::services::accounts::{BlockStatus, UserStatus, UserSummary};

/// Largest banned word list accepted, in characters.
pub const MAX_BANWORDS_CHARS: usize = 200_000;

#[derive(Debug, Default, Deserialize)]
pub struct BanwordsForm {
    #[serde(default)]
    pub content: Option<Value>,
}

/// Paging parameters; unparsable values fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageParams {
    fn parsed(&self) -> (Option<i64>, Option<i64>) {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse().ok());
        (parse(&self.limit), parse(&self.offset))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BlockForm {
    #[serde(default)]
    pub blocked: bool,
}

pub async fn get_banwords(
    State(state): State<AppState>,
    Identity(claims): Identity,
) -> Result<Json<Value>, BoardError> {
    authorize(claims.as_ref(), Action::Administer)?;
    let content = state.banned_words.read_text().await?;
    Ok(Json(json!({ "content": content })))
}

/// Replace the list file and recompile the filter in place.
pub async fn put_banwords(
    State(state): State<AppState>,
    Identity(claims): Identity,
    body: Result<JsonBody<BanwordsForm>, BoardError>,
) -> Result<Json<Value>, BoardError> {
    authorize(claims.as_ref(), Action::Administer)?;
    let JsonBody(form) = body?;
    let Some(Value::String(content)) = form.content else {
        return Err(ValidationError::Malformed("content must be text".into()).into());
    };
    if content.chars().count() > MAX_BANWORDS_CHARS {
        return Err(ValidationError::Malformed("content too long".into()).into());
    }
    let count = state
        .banned_words
        .replace(&content)
        .await
        .map_err(|e| match e {
            ReplaceError::Invalid(msg) => BoardError::from(ValidationError::Malformed(msg)),
            ReplaceError::Io(io) => BoardError::Io(io),
        })?;
    Ok(Json(json!({ "ok": true, "count": count })))
}

pub async fn list_users(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<UserSummary>>, BoardError> {
    authorize(claims.as_ref(), Action::Administer)?;
    let (limit, offset) = page.parsed();
    Ok(Json(state.accounts.list_users(limit, offset).await?))
}

pub async fn count_users(
    State(state): State<AppState>,
    Identity(claims): Identity,
) -> Result<Json<Value>, BoardError> {
    authorize(claims.as_ref(), Action::Administer)?;
    let count = state.accounts.count_users().await?;
    Ok(Json(json!({ "count": count })))
}

pub async fn user_status(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Path(username): Path<String>,
) -> Result<Json<UserStatus>, BoardError> {
    authorize(claims.as_ref(), Action::Administer)?;
    Ok(Json(state.accounts.status(&username).await?))
}

pub async fn set_blocked(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Path(username): Path<String>,
    body: Result<JsonBody<BlockForm>, BoardError>,
) -> Result<Json<BlockStatus>, BoardError> {
    authorize(claims.as_ref(), Action::Administer)?;
    let JsonBody(form) = body?;
    Ok(Json(state.accounts.set_blocked(&username, form.blocked).await?))
}
