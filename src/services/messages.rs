//! Private messages between two named users.

use crate::error::{BoardError, ValidationError};
use crate::models::Message;
use crate::storage::DynStorage;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageForm {
    pub to_username: Option<String>,
    pub content: Option<String>,
}

pub struct Messages {
    storage: DynStorage,
}

impl Messages {
    pub fn new(storage: DynStorage) -> Self {
        Self { storage }
    }

    /// Store a message from `from`. The recipient is not checked against
    /// registered accounts.
    pub async fn send(&self, from: &str, form: &MessageForm) -> Result<Message, BoardError> {
        let to = form
            .to_username
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingField("to_username"))?;
        let content = form
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(ValidationError::MissingField("content"))?;
        let message = self
            .storage
            .send_message(from, to, content)
            .await
            .map_err(BoardError::storage)?;
        tracing::debug!(id = message.id, "message stored");
        Ok(message)
    }

    pub async fn inbox(&self, username: &str) -> Result<Vec<Message>, BoardError> {
        self.storage.inbox(username).await.map_err(BoardError::storage)
    }

    pub async fn outbox(&self, username: &str) -> Result<Vec<Message>, BoardError> {
        self.storage.outbox(username).await.map_err(BoardError::storage)
    }
}
