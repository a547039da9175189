//! Request-level workflows over the store and the generator
//!
//! Submission turns an upload into a stored review. Retrieval lists and fetches
//! stored reviews on behalf of a caller, enforcing ownership.

pub mod retrieval;
pub mod submission;

pub use retrieval::RetrievalWorkflow;
pub use submission::SubmissionWorkflow;

use crate::store::StoreError;
use crate::Error;

/// Reported when the reviews table predates ownership tracking
pub const SCHEMA_MISMATCH_MESSAGE: &str =
    "Database schema mismatch: 'user_id' column is missing in 'reviews' table";

/// Operator guidance attached to a schema mismatch
pub const SCHEMA_MISMATCH_FIX: &str =
    "Run the SQL below against the reviews database to add the column:";

/// Statement that adds the owner column
pub const ADD_OWNER_COLUMN_SQL: &str = "ALTER TABLE reviews ADD COLUMN user_id TEXT;";

/// Map a store failure that survived retries onto the service taxonomy
pub(crate) fn classify_store_error(err: StoreError) -> Error {
    if err.is_missing_owner_column() {
        Error::SchemaMismatch {
            message: SCHEMA_MISMATCH_MESSAGE.to_string(),
            fix: SCHEMA_MISMATCH_FIX.to_string(),
            sql: ADD_OWNER_COLUMN_SQL.to_string(),
            source_message: err.message,
        }
    } else {
        Error::Persistence(err.message)
    }
}
