//! Persistence gateway consumed by the review workflows

use std::fmt;

use async_trait::async_trait;

use crate::review::{NewReview, ReviewId, ReviewRecord, UserId};

/// Column the service filters and writes ownership through
pub const OWNER_COLUMN: &str = "user_id";

/// Classified store failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// A column the query relies on does not exist
    MissingColumn(String),
    /// The table itself does not exist
    MissingTable(String),
    /// The store could not be reached or the pool is exhausted
    Unavailable,
    /// Anything the gateway could not classify
    Other,
}

/// Error reported by a [`ReviewStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Unclassified failure carrying only a message
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Other, message)
    }

    /// Whether the failure means the reviews table lacks the owner column.
    ///
    /// Gateways that classify their errors report `MissingColumn`. For those
    /// that only pass through provider text the message is matched against
    /// known symptoms; that match is loose (any mention of the column counts)
    /// and can misfire on unrelated errors that quote it.
    pub fn is_missing_owner_column(&self) -> bool {
        match &self.kind {
            StoreErrorKind::MissingColumn(column) => column == OWNER_COLUMN,
            StoreErrorKind::Other => {
                self.message.contains("Could not find the 'user_id'")
                    || self.message.contains("PGRST204")
                    || self.message.contains(OWNER_COLUMN)
            }
            _ => false,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read/write access to stored reviews.
///
/// Implementations must be safe to call concurrently; the workflows never lock
/// around them.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Insert a review, assigning its id and creation time
    async fn insert(&self, review: NewReview) -> StoreResult<ReviewRecord>;

    /// Reviews whose owner equals `owner`, newest first.
    ///
    /// `None` follows SQL equality on NULL and matches nothing.
    async fn list_by_owner(&self, owner: Option<&UserId>) -> StoreResult<Vec<ReviewRecord>>;

    /// A single review, if it exists
    async fn get(&self, id: &ReviewId) -> StoreResult<Option<ReviewRecord>>;
}
