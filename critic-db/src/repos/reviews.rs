//! Review repository backing the core `ReviewStore` gateway

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use critic_core::store::{ReviewStore, StoreError, StoreErrorKind, StoreResult};
use critic_core::{NewReview, ReviewId, ReviewRecord, UserId};
use sqlx::SqlitePool;
use tracing::debug;

/// Row as stored; ids and owners are plain text columns
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: String,
    user_id: Option<String>,
    filename: String,
    review_summary: String,
    suggestions: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for ReviewRecord {
    type Error = StoreError;

    fn try_from(row: ReviewRow) -> StoreResult<Self> {
        let id = row
            .id
            .parse::<ReviewId>()
            .map_err(|_| StoreError::other(format!("stored review has malformed id '{}'", row.id)))?;

        Ok(ReviewRecord {
            id,
            filename: row.filename,
            review_summary: row.review_summary,
            suggestions: row.suggestions,
            user_id: row.user_id.map(UserId::new),
            created_at: row.created_at,
        })
    }
}

/// Repository for stored reviews
#[derive(Clone, Debug)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    /// Create a new review repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for ReviewRepository {
    async fn insert(&self, review: NewReview) -> StoreResult<ReviewRecord> {
        let id = ReviewId::new();
        // Stored with fixed microsecond precision so text order is time order
        let created_at = Utc::now().trunc_subsecs(6);

        sqlx::query(
            r#"
            INSERT INTO reviews (id, user_id, filename, review_summary, suggestions, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(review.user_id.as_ref().map(UserId::as_str))
        .bind(&review.filename)
        .bind(&review.review_summary)
        .bind(&review.suggestions)
        .bind(created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        debug!(review_id = %id, "Inserted review row");

        Ok(ReviewRecord {
            id,
            filename: review.filename,
            review_summary: review.review_summary,
            suggestions: review.suggestions,
            user_id: review.user_id,
            created_at,
        })
    }

    async fn list_by_owner(&self, owner: Option<&UserId>) -> StoreResult<Vec<ReviewRecord>> {
        // `user_id = NULL` is never true
        let Some(owner) = owner else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, user_id, filename, review_summary, suggestions, created_at
             FROM reviews WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        rows.into_iter().map(ReviewRecord::try_from).collect()
    }

    async fn get(&self, id: &ReviewId) -> StoreResult<Option<ReviewRecord>> {
        sqlx::query_as::<_, ReviewRow>(
            "SELECT id, user_id, filename, review_summary, suggestions, created_at
             FROM reviews WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .map(ReviewRecord::try_from)
        .transpose()
    }
}

/// Map a driver error onto the gateway's failure kinds
fn classify(err: sqlx::Error) -> StoreError {
    let kind = match &err {
        sqlx::Error::Database(db) => classify_message(db.message()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreErrorKind::Unavailable
        }
        _ => StoreErrorKind::Other,
    };
    StoreError::new(kind, err.to_string())
}

fn classify_message(message: &str) -> StoreErrorKind {
    // "no such column: reviews.user_id" when the query qualifies it
    let unqualified = |name: &str| {
        let name = name.trim();
        name.rsplit('.').next().unwrap_or(name).to_string()
    };

    if let Some(column) = message.strip_prefix("no such column: ") {
        StoreErrorKind::MissingColumn(unqualified(column))
    } else if let Some((_, column)) = message.split_once("has no column named ") {
        StoreErrorKind::MissingColumn(unqualified(column))
    } else if let Some(table) = message.strip_prefix("no such table: ") {
        StoreErrorKind::MissingTable(unqualified(table))
    } else {
        StoreErrorKind::Other
    }
}
