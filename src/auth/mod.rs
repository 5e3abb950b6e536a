use crate::models::{Role, User};
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

/// Account store: credentials, role and block flag.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account with a freshly salted password hash.
    /// Returns `None` if the username is already taken.
    async fn add_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<Option<User>, Box<dyn Error + Send + Sync>>;

    async fn get_user(&self, username: &str) -> Result<Option<User>, Box<dyn Error + Send + Sync>>;

    /// Returns the account when `password` matches its stored hash.
    async fn verify_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, Box<dyn Error + Send + Sync>>;

    /// Returns false if the account does not exist.
    async fn set_role(&self, username: &str, role: Role) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// Returns false if the account does not exist.
    async fn set_blocked(
        &self,
        username: &str,
        blocked: bool,
    ) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// Accounts ordered newest first.
    async fn list_users(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, Box<dyn Error + Send + Sync>>;

    async fn count_users(&self) -> Result<i64, Box<dyn Error + Send + Sync>>;
}

pub type DynAuth = Arc<dyn AuthProvider>;

pub mod migrations;
pub mod sqlite;
pub mod token;

/// Create an authentication backend from a connection URI.
pub async fn open(uri: &str) -> Result<DynAuth, Box<dyn Error + Send + Sync>> {
    if uri.starts_with("sqlite:") {
        Ok(Arc::new(sqlite::SqliteAuth::new(uri).await?))
    } else {
        Err(format!("unknown auth backend: {uri}").into())
    }
}
