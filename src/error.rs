//! Domain error types for the idea board
//!
//! Errors are structured internally for logging/debugging but provide
//! generic responses to clients where the detail would leak internals
//! (storage and configuration failures).

use thiserror::Error;

/// Top-level service error type
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Forbidden: {0}")]
    Forbidden(#[from] ForbiddenError),

    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("username must be between 3 and 20 characters")]
    UsernameLength,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("{field} exceeds {limit} bytes")]
    TooLarge { field: &'static str, limit: u64 },

    #[error("unknown category: {0}")]
    InvalidCategory(String),

    #[error("invalid date, expected YYYY-MM-DD: {0}")]
    InvalidDate(String),

    #[error("content contains banned words")]
    BannedContent,

    #[error("unsupported file type: {0}")]
    UnsupportedMedia(String),

    #[error("{0}")]
    Malformed(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication required")]
    Required,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("account no longer exists")]
    UnknownAccount,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ForbiddenError {
    #[error("account is blocked")]
    Blocked,

    #[error("administrator privileges required")]
    AdminRequired,

    #[error("cannot access another user's data")]
    NotOwner,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl BoardError {
    /// Wrap a backend error coming out of a storage or auth provider.
    pub fn storage(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        BoardError::Storage(StorageError::Database(err))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            BoardError::Validation(_) => 400,
            BoardError::Auth(_) => 401,
            BoardError::Forbidden(_) => 403,
            BoardError::NotFound(_) => 404,
            BoardError::Conflict(_) => 409,
            BoardError::Storage(_) | BoardError::Config(_) | BoardError::Io(_) => 500,
        }
    }

    /// Get a client-safe response message
    pub fn client_message(&self) -> String {
        match self {
            BoardError::Validation(e) => e.to_string(),
            BoardError::Auth(e) => e.to_string(),
            BoardError::Forbidden(e) => e.to_string(),
            BoardError::NotFound(what) => format!("{what} not found"),
            BoardError::Conflict(msg) => msg.clone(),
            BoardError::Storage(_) | BoardError::Config(_) | BoardError::Io(_) => {
                "internal server error".to_string()
            }
        }
    }

    /// Whether the error is an internal failure rather than a client mistake
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }
}
