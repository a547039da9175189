//! Listing and fetching stored reviews with ownership checks

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::retry::RetryPolicy;
use crate::review::{ReviewId, ReviewRecord, UserId};
use crate::store::ReviewStore;
use crate::{Error, Result};

use super::classify_store_error;

/// Reads reviews on behalf of a caller
#[derive(Clone)]
pub struct RetrievalWorkflow {
    store: Arc<dyn ReviewStore>,
    retry: RetryPolicy,
}

impl RetrievalWorkflow {
    pub fn new(store: Arc<dyn ReviewStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Reviews owned by `caller`, newest first, in the order the store returns them
    pub async fn list(&self, caller: Option<&UserId>) -> Result<Vec<ReviewRecord>> {
        let store = Arc::clone(&self.store);
        let reports = self
            .retry
            .execute(|| {
                let store = Arc::clone(&store);
                let owner = caller.cloned();
                async move { store.list_by_owner(owner.as_ref()).await }
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list reports");
                classify_store_error(e)
            })?;

        debug!(count = reports.len(), "Listed reports");
        Ok(reports)
    }

    /// A single review by its identifier.
    ///
    /// Records owned by someone else are forbidden. Records without an owner
    /// are returned to any caller; see `ReviewRecord::is_readable_by`.
    pub async fn get(&self, id: &str, caller: Option<&UserId>) -> Result<ReviewRecord> {
        let not_found = || Error::NotFound("Report not found".to_string());
        let id: ReviewId = id.parse().map_err(|_| not_found())?;

        let store = Arc::clone(&self.store);
        let record = self
            .retry
            .execute(|| {
                let store = Arc::clone(&store);
                async move { store.get(&id).await }
            })
            .await
            .map_err(|e| {
                error!(review_id = %id, error = %e, "Failed to fetch report");
                classify_store_error(e)
            })?
            .ok_or_else(not_found)?;

        if !record.is_readable_by(caller) {
            warn!(
                review_id = %id,
                caller = caller.map(UserId::as_str),
                "Rejected access to report owned by another user"
            );
            return Err(Error::Forbidden(format!("report {id} belongs to another user")));
        }

        Ok(record)
    }
}

impl std::fmt::Debug for RetrievalWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalWorkflow")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
