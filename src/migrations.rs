use anyhow::{Context, Result, bail};
use async_trait::async_trait;

/// A single schema upgrade step.
///
/// Each migration moves the database from the previous version to
/// [`Migration::target_version`]. Applying the same step twice must be harmless.
#[async_trait]
pub trait Migration: Send + Sync {
    /// The version this migration upgrades to.
    fn target_version(&self) -> u32;

    /// A human-readable description of what this migration does.
    fn description(&self) -> &str;

    /// Apply this migration to the database.
    async fn apply(&self) -> Result<()>;
}

/// Tracks the stored schema version of one database and applies pending
/// migrations in order.
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Get the current schema version stored in the backend.
    ///
    /// Fails when the version table is missing, which marks a fresh database.
    async fn get_current_version(&self) -> Result<u32>;

    /// Set the schema version in the backend.
    async fn set_version(&self, version: u32) -> Result<()>;

    /// All migrations for this backend, ordered by target version.
    fn get_migrations(&self) -> Vec<Box<dyn Migration>>;

    /// Check if this is a fresh database that needs the current schema created.
    async fn is_fresh_database(&self) -> bool {
        self.get_current_version().await.is_err()
    }

    /// Highest version any known migration reaches, or 1 when there are none.
    fn latest_version(&self) -> u32 {
        self.get_migrations()
            .iter()
            .map(|m| m.target_version())
            .max()
            .unwrap_or(1)
    }

    /// Apply all pending migrations.
    ///
    /// Call this only on a database that already carries a version; fresh
    /// databases get the current schema and are stamped with
    /// [`Migrator::latest_version`] instead.
    async fn migrate_to_latest(&self) -> Result<()> {
        let current_version = self.get_current_version().await?;
        let migrations = self.get_migrations();

        if migrations.is_empty() {
            tracing::info!("No migrations available");
            return Ok(());
        }

        let latest_version = self.latest_version();

        if current_version > latest_version {
            bail!(
                "stored schema version {current_version} is newer than the latest known version \
                 {latest_version}; refusing to run an older build against a newer database"
            );
        }

        if current_version == latest_version {
            tracing::info!(version = current_version, "database schema is up to date");
            return Ok(());
        }

        tracing::info!(
            from = current_version,
            to = latest_version,
            "migrating database schema"
        );

        for migration in migrations {
            let target = migration.target_version();
            if target <= current_version {
                continue;
            }

            tracing::info!(version = target, "applying migration: {}", migration.description());

            migration
                .apply()
                .await
                .with_context(|| format!("failed to apply migration to version {target}"))?;

            self.set_version(target)
                .await
                .with_context(|| format!("failed to update schema version to {target}"))?;
        }

        tracing::info!("database migration completed");
        Ok(())
    }
}
