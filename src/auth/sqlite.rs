use super::migrations::sqlite::SqliteAuthMigrator;
use super::{AuthProvider, Error, async_trait};
use crate::models::{Role, User};
use crate::storage::common::{from_millis, now_millis};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};
use std::str::FromStr;

const USER_COLUMNS: &str = "id, username, role, blocked, created_at";

fn user_from_row(row: &SqliteRow) -> Result<User, Box<dyn Error + Send + Sync>> {
    let role: String = row.try_get("role")?;
    let blocked: i64 = row.try_get("blocked")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        role: role.parse()?,
        blocked: blocked != 0,
        created_at: from_millis(row.try_get("created_at")?),
    })
}

#[derive(Clone)]
pub struct SqliteAuth {
    pool: SqlitePool,
}

impl SqliteAuth {
    /// Create a new `SQLite` authentication provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| {
                format!(
                    "Invalid SQLite authentication database URI '{path}': {e}

Please ensure the URI is in the correct format:
- File database: sqlite:///path/to/auth.db
- In-memory database: sqlite::memory:"
                )
            })?
            .create_if_missing(true);

        let max_connections = if path.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                format!("Failed to connect to SQLite authentication database '{path}': {e}")
            })?;

        SqliteAuthMigrator::new(pool.clone()).prepare().await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl AuthProvider for SqliteAuth {
    #[tracing::instrument(skip_all)]
    async fn add_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<Option<User>, Box<dyn Error + Send + Sync>> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string();
        let now = now_millis();
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, role, blocked, created_at) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(username)
        .bind(hash)
        .bind(role.as_str())
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(Some(User {
                id: done.last_insert_rowid(),
                username: username.to_string(),
                role,
                blocked: false,
                created_at: from_millis(now),
            })),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip_all)]
    async fn get_user(&self, username: &str) -> Result<Option<User>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[tracing::instrument(skip_all)]
    async fn verify_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, Box<dyn Error + Send + Sync>> {
        let Some(row) = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let stored: String = row.try_get("password_hash")?;
        let parsed = PasswordHash::new(&stored)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
        {
            Ok(Some(user_from_row(&row)?))
        } else {
            Ok(None)
        }
    }

    #[tracing::instrument(skip_all)]
    async fn set_role(&self, username: &str, role: Role) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let updated = sqlx::query("UPDATE users SET role = ? WHERE username = ?")
            .bind(role.as_str())
            .bind(username)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(updated > 0)
    }

    #[tracing::instrument(skip_all)]
    async fn set_blocked(
        &self,
        username: &str,
        blocked: bool,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let updated = sqlx::query("UPDATE users SET blocked = ? WHERE username = ?")
            .bind(i64::from(blocked))
            .bind(username)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(updated > 0)
    }

    #[tracing::instrument(skip_all)]
    async fn list_users(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    #[tracing::instrument(skip_all)]
    async fn count_users(&self) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
