use crate::migrations::{Migration, Migrator};
use crate::storage::migrations::sqlite::has_column;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

const CREATE_VERSION_TABLE_SQLITE: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
)";

pub(crate) const USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        blocked INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    )";

/// Migration to version 2: role and blocked columns on users
struct MigrationV2 {
    pool: SqlitePool,
}

#[async_trait]
impl Migration for MigrationV2 {
    fn target_version(&self) -> u32 {
        2
    }

    fn description(&self) -> &str {
        "Add role and blocked columns to users"
    }

    async fn apply(&self) -> Result<()> {
        if !has_column(&self.pool, "users", "role").await? {
            sqlx::query("ALTER TABLE users ADD COLUMN role TEXT NOT NULL DEFAULT 'user'")
                .execute(&self.pool)
                .await?;
        }
        if !has_column(&self.pool, "users", "blocked").await? {
            sqlx::query("ALTER TABLE users ADD COLUMN blocked INTEGER NOT NULL DEFAULT 0")
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

/// SQLite auth migrator
pub struct SqliteAuthMigrator {
    pool: SqlitePool,
}

impl SqliteAuthMigrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the current schema on a fresh database, or upgrade an existing one.
    pub async fn prepare(&self) -> Result<()> {
        if self.is_fresh_database().await {
            sqlx::query(USERS_TABLE).execute(&self.pool).await?;
            self.set_version(self.latest_version()).await?;
            tracing::info!(version = self.latest_version(), "initialized account schema");
            Ok(())
        } else {
            self.migrate_to_latest().await
        }
    }
}

#[async_trait]
impl Migrator for SqliteAuthMigrator {
    async fn get_current_version(&self) -> Result<u32> {
        let row = sqlx::query("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await;

        match row {
            Ok(Some(row)) => {
                let version: i64 = row.try_get("version")?;
                Ok(u32::try_from(version)?)
            }
            Ok(None) => Ok(0),
            Err(_) => Err(anyhow::anyhow!("version table does not exist")),
        }
    }

    async fn set_version(&self, version: u32) -> Result<()> {
        sqlx::query(CREATE_VERSION_TABLE_SQLITE)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM schema_version")
            .execute(&self.pool)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(i64::from(version))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn get_migrations(&self) -> Vec<Box<dyn Migration>> {
        vec![Box::new(MigrationV2 {
            pool: self.pool.clone(),
        })]
    }
}
