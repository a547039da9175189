//! Database layer for Critic
//!
//! Stores reviews in SQLite and exposes them through the `ReviewStore`
//! gateway the core workflows consume.

pub mod error;
pub mod repos;
pub mod schema;

use std::path::Path;

use critic_core::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

pub use error::{Error, Result};
pub use repos::reviews::ReviewRepository;
pub use schema::{SchemaStatus, CREATE_TABLE_SQL};

/// Database connection pool
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database described by `config`, migrating it when enabled
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db = Self::open(&config.path, config.max_connections).await?;

        if config.auto_migrate {
            db.migrate().await?;
        }

        Ok(db)
    }

    /// Open or create a database file without touching its schema
    pub async fn open(db_path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let db_path = db_path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(format!("Failed to create database directory: {}", e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        debug!(path = %db_path.display(), "Opened review database");
        Ok(Self { pool })
    }

    /// Create the reviews table and index, repairing a missing owner column
    pub async fn migrate(&self) -> Result<()> {
        schema::migrate(&self.pool).await?;
        info!("Review database schema is up to date");
        Ok(())
    }

    /// Report whether the reviews table exists and carries the owner column
    pub async fn verify_schema(&self) -> Result<SchemaStatus> {
        schema::inspect(&self.pool).await
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the reviews repository
    pub fn reviews(&self) -> ReviewRepository {
        ReviewRepository::new(self.pool.clone())
    }
}
