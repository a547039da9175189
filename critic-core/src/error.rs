//! Error types for Critic

use thiserror::Error;

/// Result type alias for Critic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Critic operations
#[derive(Error, Debug)]
pub enum Error {
    /// The request is missing something the caller must supply
    #[error("{0}")]
    Validation(String),

    /// The store is missing a column the service writes or filters on
    #[error("{message}")]
    SchemaMismatch {
        /// Human-readable description of the drift
        message: String,
        /// What the operator should do about it
        fix: String,
        /// Statement that repairs the schema
        sql: String,
        /// Underlying store message
        source_message: String,
    },

    /// Store failure that survived all retries
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller does not own the requested resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Text-generation capability failed or returned nothing usable
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error is the caller's fault rather than the service's
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::NotFound(_) | Error::Forbidden(_)
        )
    }
}
