//! Reviews table definition and schema inspection

use critic_core::workflow::ADD_OWNER_COLUMN_SQL;
use sqlx::SqlitePool;

use crate::{Error, Result};

/// Name of the table holding reviews
pub const REVIEWS_TABLE: &str = "reviews";

/// Statement creating the reviews table from scratch
pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS reviews (
    id TEXT PRIMARY KEY,
    user_id TEXT,
    filename TEXT NOT NULL,
    review_summary TEXT NOT NULL,
    suggestions TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
)";

/// Index serving the per-owner listing
pub const CREATE_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_reviews_user_created ON reviews(user_id, created_at)";

/// What the reviews table currently looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaStatus {
    pub table_exists: bool,
    pub has_user_id: bool,
}

impl SchemaStatus {
    /// Whether reviews can be stored and listed per owner
    pub fn is_ready(&self) -> bool {
        self.table_exists && self.has_user_id
    }

    /// Turn an incomplete schema into an error naming the statement that fixes it
    pub fn ensure_ready(&self) -> Result<()> {
        if !self.table_exists {
            return Err(Error::Schema(format!(
                "table '{REVIEWS_TABLE}' does not exist; create it with:\n{CREATE_TABLE_SQL};"
            )));
        }
        if !self.has_user_id {
            return Err(Error::Schema(format!(
                "table '{REVIEWS_TABLE}' has no 'user_id' column; add it with:\n{ADD_OWNER_COLUMN_SQL}"
            )));
        }
        Ok(())
    }
}

pub(crate) async fn inspect(pool: &SqlitePool) -> Result<SchemaStatus> {
    let (tables,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(REVIEWS_TABLE)
            .fetch_one(pool)
            .await?;

    if tables == 0 {
        return Ok(SchemaStatus {
            table_exists: false,
            has_user_id: false,
        });
    }

    let (columns,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM pragma_table_info('reviews') WHERE name = 'user_id'")
            .fetch_one(pool)
            .await?;

    Ok(SchemaStatus {
        table_exists: true,
        has_user_id: columns > 0,
    })
}

/// Create the table and index, adding the owner column to older tables
pub(crate) async fn migrate(pool: &SqlitePool) -> Result<()> {
    let run = |e: sqlx::Error| Error::Migration(e.to_string());

    sqlx::query(CREATE_TABLE_SQL).execute(pool).await.map_err(run)?;

    // Tables created before ownership existed
    if !inspect(pool).await?.has_user_id {
        tracing::warn!("Adding missing 'user_id' column to reviews table");
        sqlx::query(ADD_OWNER_COLUMN_SQL)
            .execute(pool)
            .await
            .map_err(run)?;
    }

    sqlx::query(CREATE_INDEX_SQL).execute(pool).await.map_err(run)?;
    Ok(())
}
