//! Review record types shared by the workflows and the store

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored review, assigned by the store at insert time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(Uuid);

impl ReviewId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ReviewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Identity of an authenticated caller, as resolved by the auth layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A persisted code review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: ReviewId,
    pub filename: String,
    pub review_summary: String,
    pub suggestions: String,
    /// Owning user; `None` marks a legacy or anonymous record
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// Whether `caller` may read this record.
    ///
    /// Records without an owner are readable by everyone.
    pub fn is_readable_by(&self, caller: Option<&UserId>) -> bool {
        match &self.user_id {
            None => true,
            Some(owner) => caller == Some(owner),
        }
    }
}

/// Fields supplied by the submission workflow when inserting a review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub filename: String,
    pub review_summary: String,
    pub suggestions: String,
    pub user_id: Option<UserId>,
}

/// Response returned to the submitter. Never carries the uploaded content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedReview {
    pub id: ReviewId,
    pub filename: String,
    pub review_summary: String,
    pub suggestions: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRecord> for SubmittedReview {
    fn from(record: ReviewRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            review_summary: record.review_summary,
            suggestions: record.suggestions,
            created_at: record.created_at,
        }
    }
}

/// An uploaded source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Content decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}
