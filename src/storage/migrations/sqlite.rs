use crate::migrations::{Migration, Migrator};
use crate::storage::common::sql;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

const CREATE_VERSION_TABLE_SQLITE: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
)";

/// Whether `table` already has `column`.
pub(crate) async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await?;
    for row in rows {
        let name: String = row.try_get("name")?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Migration to version 2: comment images, favorites, messages and lookup indexes.
struct MigrationV2 {
    pool: SqlitePool,
}

#[async_trait]
impl Migration for MigrationV2 {
    fn target_version(&self) -> u32 {
        2
    }

    fn description(&self) -> &str {
        "Add comment images, favorites and messages tables, and lookup indexes"
    }

    async fn apply(&self) -> Result<()> {
        if !has_column(&self.pool, "comments", "image_url").await? {
            sqlx::query("ALTER TABLE comments ADD COLUMN image_url TEXT")
                .execute(&self.pool)
                .await?;
        }
        sqlx::query(sql::FAVORITES_TABLE).execute(&self.pool).await?;
        sqlx::query(sql::MESSAGES_TABLE).execute(&self.pool).await?;
        for index in sql::INDEXES {
            sqlx::query(index).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// SQLite storage migrator
pub struct SqliteStorageMigrator {
    pool: SqlitePool,
}

impl SqliteStorageMigrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the current schema on a fresh database, or upgrade an existing one.
    pub async fn prepare(&self) -> Result<()> {
        if self.is_fresh_database().await {
            sqlx::query(sql::IDEAS_TABLE).execute(&self.pool).await?;
            sqlx::query(sql::COMMENTS_TABLE).execute(&self.pool).await?;
            sqlx::query(sql::LIKES_TABLE).execute(&self.pool).await?;
            sqlx::query(sql::FAVORITES_TABLE).execute(&self.pool).await?;
            sqlx::query(sql::MESSAGES_TABLE).execute(&self.pool).await?;
            for index in sql::INDEXES {
                sqlx::query(index).execute(&self.pool).await?;
            }
            self.set_version(self.latest_version()).await?;
            tracing::info!(version = self.latest_version(), "initialized idea store schema");
            Ok(())
        } else {
            self.migrate_to_latest().await
        }
    }
}

#[async_trait]
impl Migrator for SqliteStorageMigrator {
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
