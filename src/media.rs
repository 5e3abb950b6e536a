//! Local storage for uploaded images.

use crate::error::{BoardError, ValidationError};
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Accepted image types and the extension stored files get.
const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// File extension for an accepted content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime: mime::Mime = content_type.parse().ok()?;
    let essence = mime.essence_str();
    ALLOWED_TYPES
        .iter()
        .find(|(ty, _)| *ty == essence)
        .map(|(_, ext)| *ext)
}

#[derive(Clone)]
pub struct LocalImageStorage {
    upload_dir: PathBuf,
    url_prefix: String,
    max_bytes: u64,
}

impl LocalImageStorage {
    pub fn new(upload_dir: impl Into<PathBuf>, url_prefix: &str, max_bytes: u64) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check type and size, then write under a random name. Returns the public URL.
    pub async fn save_image(&self, bytes: &[u8], content_type: Option<&str>) -> Result<String, BoardError> {
        let content_type = content_type.unwrap_or("application/octet-stream");
        let extension = extension_for(content_type)
            .ok_or_else(|| ValidationError::UnsupportedMedia(content_type.to_string()))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(ValidationError::TooLarge {
                field: "image",
                limit: self.max_bytes,
            }
            .into());
        }

        let filename = format!("{}.{extension}", Uuid::new_v4());
        fs::create_dir_all(&self.upload_dir).await?;
        fs::write(self.upload_dir.join(&filename), bytes).await?;
        tracing::info!(file = %filename, size = bytes.len(), "stored upload");

        Ok(format!("{}/{filename}", self.url_prefix))
    }
}
