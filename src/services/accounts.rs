//! Registration, login, token refresh and account administration.

use crate::auth::DynAuth;
use crate::auth::token::{Claims, TokenSigner};
use crate::error::{AuthError, BoardError, ForbiddenError, ValidationError};
use crate::models::{PublicUser, Role, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 20;
pub const PASSWORD_MIN_CHARS: usize = 6;

const DEFAULT_PAGE: i64 = 100;
const MAX_PAGE: i64 = 500;

/// A user together with a freshly signed token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            blocked: user.blocked,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStatus {
    pub username: String,
    pub role: Role,
    pub blocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockStatus {
    pub username: String,
    pub blocked: bool,
}

/// Clamp admin paging input: limit to `[1, 500]` (default 100), offset to `>= 0`.
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.filter(|l| *l != 0).unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::MissingField("username"));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    let chars = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&chars) {
        return Err(ValidationError::UsernameLength);
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub struct Accounts {
    auth: DynAuth,
    signer: TokenSigner,
    seed_admin: Option<String>,
}

impl Accounts {
    pub fn new(auth: DynAuth, signer: TokenSigner, seed_admin: Option<String>) -> Self {
        Self {
            auth,
            signer,
            seed_admin,
        }
    }

    fn session(&self, user: PublicUser) -> Result<Session, BoardError> {
        let token = self.signer.issue(&user)?;
        Ok(Session { user, token })
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Session, BoardError> {
        validate_credentials(username, password)?;
        let user = self
            .auth
            .add_user(username, password, Role::User)
            .await
            .map_err(BoardError::storage)?
            .ok_or_else(|| BoardError::Conflict("username already exists".into()))?;
        tracing::info!(username = %user.username, "registered account");
        self.session(PublicUser::from(&user))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, BoardError> {
        if username.is_empty() {
            return Err(ValidationError::MissingField("username").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }
        let mut user = self
            .auth
            .verify_user(username, password)
            .await
            .map_err(BoardError::storage)?
            .ok_or(AuthError::InvalidCredentials)?;
        if user.blocked {
            return Err(ForbiddenError::Blocked.into());
        }
        if self.seed_admin.as_deref() == Some(user.username.as_str()) && user.role != Role::Admin {
            self.auth
                .set_role(&user.username, Role::Admin)
                .await
                .map_err(BoardError::storage)?;
            user.role = Role::Admin;
            tracing::info!(username = %user.username, "promoted seed admin");
        }
        self.session(PublicUser::from(&user))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.signer.verify(token)
    }

    /// Re-read the account and reissue a token with its current role and block flag.
    pub async fn who_am_i(&self, claims: &Claims) -> Result<Session, BoardError> {
        let user = self
            .auth
            .get_user(&claims.username)
            .await
            .map_err(BoardError::storage)?
            .ok_or(AuthError::UnknownAccount)?;
        self.session(PublicUser::from(&user))
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<UserSummary>, BoardError> {
        let (limit, offset) = clamp_page(limit, offset);
        let users = self
            .auth
            .list_users(limit, offset)
            .await
            .map_err(BoardError::storage)?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    pub async fn count_users(&self) -> Result<i64, BoardError> {
        self.auth.count_users().await.map_err(BoardError::storage)
    }

    pub async fn status(&self, username: &str) -> Result<UserStatus, BoardError> {
        let user = self
            .auth
            .get_user(username)
            .await
            .map_err(BoardError::storage)?
            .ok_or(BoardError::NotFound("user"))?;
        Ok(UserStatus {
            username: user.username,
            role: user.role,
            blocked: user.blocked,
        })
    }

    pub async fn set_blocked(&self, username: &str, blocked: bool) -> Result<BlockStatus, BoardError> {
        let found = self
            .auth
            .set_blocked(username, blocked)
            .await
            .map_err(BoardError::storage)?;
        if !found {
            return Err(BoardError::NotFound("user"));
        }
        tracing::info!(username, blocked, "changed block status");
        Ok(BlockStatus {
            username: username.to_string(),
            blocked,
        })
    }
}
