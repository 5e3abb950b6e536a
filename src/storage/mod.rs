use crate::models::{
    Comment, FavoriteState, Idea, IdeaQuery, LikeState, Message, NewComment, NewIdea,
    ReceivedComment,
};
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

/// Persistence for ideas and everything hanging off them.
///
/// Methods returning `Option` yield `None` when the referenced idea or
/// comment does not exist.
#[async_trait]
pub trait Storage: Send + Sync {
    /// List ideas matching `query` with live like and comment counts.
    async fn list_ideas(&self, query: &IdeaQuery) -> Result<Vec<Idea>, Box<dyn Error + Send + Sync>>;

    /// Retrieve one idea with live counts.
    async fn get_idea(&self, id: i64) -> Result<Option<Idea>, Box<dyn Error + Send + Sync>>;

    /// Insert an idea and return it as stored.
    async fn create_idea(&self, idea: &NewIdea) -> Result<Idea, Box<dyn Error + Send + Sync>>;

    /// Overwrite the editable fields of an idea and bump `updated_at`.
    async fn update_idea(
        &self,
        id: i64,
        idea: &NewIdea,
    ) -> Result<Option<Idea>, Box<dyn Error + Send + Sync>>;

    /// Delete an idea together with its comments, likes and favorites.
    /// Returns false if the idea did not exist.
    async fn delete_idea(&self, id: i64) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// Flip the like of `origin` on an idea.
    async fn toggle_like(
        &self,
        idea_id: i64,
        origin: &str,
    ) -> Result<Option<LikeState>, Box<dyn Error + Send + Sync>>;

    async fn like_status(
        &self,
        idea_id: i64,
        origin: &str,
    ) -> Result<Option<LikeState>, Box<dyn Error + Send + Sync>>;

    /// Flip the favorite of `username` on an idea.
    async fn toggle_favorite(
        &self,
        idea_id: i64,
        username: &str,
    ) -> Result<Option<FavoriteState>, Box<dyn Error + Send + Sync>>;

    async fn favorite_status(
        &self,
        idea_id: i64,
        username: &str,
    ) -> Result<Option<FavoriteState>, Box<dyn Error + Send + Sync>>;

    /// Ideas favorited by `username`, most recently favorited first.
    async fn list_favorites(&self, username: &str) -> Result<Vec<Idea>, Box<dyn Error + Send + Sync>>;

    /// Comments on an idea, newest first.
    async fn list_comments(&self, idea_id: i64) -> Result<Vec<Comment>, Box<dyn Error + Send + Sync>>;

    /// Insert a comment and bump the idea's comment counter in one transaction.
    async fn add_comment(
        &self,
        idea_id: i64,
        comment: &NewComment,
    ) -> Result<Option<Comment>, Box<dyn Error + Send + Sync>>;

    /// Delete a comment and decrement its idea's counter in one transaction.
    async fn delete_comment(&self, id: i64) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// Comments left on ideas whose author is `author`, newest first.
    async fn comments_received(
        &self,
        author: &str,
    ) -> Result<Vec<ReceivedComment>, Box<dyn Error + Send + Sync>>;

    async fn send_message(
        &self,
        from: &str,
        to: &str,
        content: &str,
    ) -> Result<Message, Box<dyn Error + Send + Sync>>;

    /// Messages addressed to `username`, newest first.
    async fn inbox(&self, username: &str) -> Result<Vec<Message>, Box<dyn Error + Send + Sync>>;

    /// Messages sent by `username`, newest first.
    async fn outbox(&self, username: &str) -> Result<Vec<Message>, Box<dyn Error + Send + Sync>>;
}

pub type DynStorage = Arc<dyn Storage>;

pub mod common;
pub mod migrations;
pub mod sqlite;

/// Create a storage backend from a connection URI.
pub async fn open(uri: &str) -> Result<DynStorage, Box<dyn Error + Send + Sync>> {
    if uri.starts_with("sqlite:") {
        Ok(Arc::new(sqlite::SqliteStorage::new(uri).await?))
    } else {
        Err(format!("unknown storage backend: {uri}").into())
    }
}
