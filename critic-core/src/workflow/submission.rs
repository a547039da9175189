//! Review submission: upload in, stored review out

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

use crate::generation::ReviewGenerator;
use crate::retry::RetryPolicy;
use crate::review::{parse_review, NewReview, SubmittedReview, Upload, UserId};
use crate::store::ReviewStore;
use crate::{Error, Result};

use super::classify_store_error;

/// Stored in place of a summary when the generated text opens with suggestions
pub const EMPTY_SUMMARY_PLACEHOLDER: &str = "No summary provided.";

/// Default bound on a single generation call
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Generates, parses and stores a review for an uploaded file
#[derive(Clone)]
pub struct SubmissionWorkflow {
    store: Arc<dyn ReviewStore>,
    generator: Arc<dyn ReviewGenerator>,
    retry: RetryPolicy,
    generation_timeout: Duration,
}

impl SubmissionWorkflow {
    /// Create a workflow with the default generation timeout
    pub fn new(
        store: Arc<dyn ReviewStore>,
        generator: Arc<dyn ReviewGenerator>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            generator,
            retry,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Bound each generation call by `limit`
    pub fn with_generation_timeout(mut self, limit: Duration) -> Self {
        self.generation_timeout = limit;
        self
    }

    /// Review `upload` on behalf of `caller` and store the result.
    ///
    /// Exactly one record is written on success and none on any failure.
    #[instrument(skip_all, fields(caller = caller.map(UserId::as_str)))]
    pub async fn submit(
        &self,
        caller: Option<&UserId>,
        upload: Option<Upload>,
    ) -> Result<SubmittedReview> {
        let upload = upload.ok_or_else(|| Error::Validation("No file uploaded".to_string()))?;
        if upload.filename.trim().is_empty() {
            return Err(Error::Validation(
                "Uploaded file has no name".to_string(),
            ));
        }

        let source = upload.text();
        debug!(
            filename = %upload.filename,
            bytes = upload.content.len(),
            generator = self.generator.name(),
            "Requesting review"
        );

        let output = timeout(self.generation_timeout, self.generator.review_code(&source))
            .await
            .map_err(|_| {
                Error::Upstream(format!(
                    "review generation timed out after {}",
                    humantime::format_duration(self.generation_timeout)
                ))
            })??;

        let parsed = parse_review(&output.into_text()?);
        let review_summary = if parsed.summary.is_empty() {
            EMPTY_SUMMARY_PLACEHOLDER.to_string()
        } else {
            parsed.summary
        };

        let review = NewReview {
            filename: upload.filename,
            review_summary,
            suggestions: parsed.suggestions,
            user_id: caller.cloned(),
        };

        let store = Arc::clone(&self.store);
        let record = self
            .retry
            .execute(|| {
                let store = Arc::clone(&store);
                let review = review.clone();
                async move { store.insert(review).await }
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to store review");
                classify_store_error(e)
            })?;

        info!(review_id = %record.id, filename = %record.filename, "Review stored");
        Ok(record.into())
    }
}

impl std::fmt::Debug for SubmissionWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionWorkflow")
            .field("generator", &self.generator.name())
            .field("retry", &self.retry)
            .field("generation_timeout", &self.generation_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationOutput;
    use crate::store::{StoreError, StoreErrorKind};
    use crate::testing::{MemoryStore, StaticGenerator};

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    fn workflow(
        store: &Arc<MemoryStore>,
        generator: StaticGenerator,
    ) -> SubmissionWorkflow {
        SubmissionWorkflow::new(store.clone(), Arc::new(generator), fast_retry())
    }

    #[tokio::test]
    async fn test_submit_stores_parsed_review() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(StaticGenerator::text(
            "Looks fine overall.\nSuggestions: rename x to y",
        ));
        let wf = SubmissionWorkflow::new(store.clone(), generator.clone(), fast_retry());
        let alice = UserId::from("alice");

        let submitted = wf
            .submit(Some(&alice), Some(Upload::new("main.rs", "fn main() {}")))
            .await
            .unwrap();

        assert_eq!(submitted.filename, "main.rs");
        assert_eq!(submitted.review_summary, "Looks fine overall.");
        assert_eq!(submitted.suggestions, "rename x to y");

        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, submitted.id);
        assert_eq!(records[0].user_id, Some(alice));
        assert_eq!(generator.sources().await, vec!["fn main() {}".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_without_file_is_validation_error() {
        let store = Arc::new(MemoryStore::new());
        let wf = workflow(&store, StaticGenerator::text("unused"));

        let err = wf.submit(None, None).await.unwrap_err();

        assert!(matches!(err, Error::Validation(ref msg) if msg == "No file uploaded"));
        assert!(err.is_client_error());
        assert!(store.records().await.is_empty());
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_with_blank_filename_is_validation_error() {
        let store = Arc::new(MemoryStore::new());
        let wf = workflow(&store, StaticGenerator::text("unused"));

        let err = wf
            .submit(None, Some(Upload::new("  ", "code")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_anonymous_submission_has_no_owner() {
        let store = Arc::new(MemoryStore::new());
        let wf = workflow(&store, StaticGenerator::text("All good"));

        wf.submit(None, Some(Upload::new("a.py", "print(1)")))
            .await
            .unwrap();

        let records = store.records().await;
        assert_eq!(records[0].user_id, None);
        assert_eq!(records[0].suggestions, "");
    }

    #[tokio::test]
    async fn test_structured_output_is_unwrapped() {
        let store = Arc::new(MemoryStore::new());
        let wf = workflow(
            &store,
            StaticGenerator::output(GenerationOutput::Structured {
                text: Some("Solid.\nSuggestion: add docs".into()),
                model: Some("test-model".into()),
                usage: None,
            }),
        );

        let submitted = wf
            .submit(None, Some(Upload::new("lib.rs", "pub fn x() {}")))
            .await
            .unwrap();

        assert_eq!(submitted.review_summary, "Solid.");
        assert_eq!(submitted.suggestions, "add docs");
    }

    #[tokio::test]
    async fn test_leading_marker_uses_placeholder_summary() {
        let store = Arc::new(MemoryStore::new());
        let wf = workflow(&store, StaticGenerator::text("Suggestions: split main"));

        let submitted = wf
            .submit(None, Some(Upload::new("main.go", "package main")))
            .await
            .unwrap();

        assert_eq!(submitted.review_summary, EMPTY_SUMMARY_PLACEHOLDER);
        assert_eq!(submitted.suggestions, "split main");
    }

    #[tokio::test]
    async fn test_generator_failure_is_upstream_and_stores_nothing() {
        let store = Arc::new(MemoryStore::new());
        let wf = workflow(&store, StaticGenerator::failing("rate limited"));

        let err = wf
            .submit(None, Some(Upload::new("main.rs", "fn main() {}")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upstream(ref msg) if msg == "rate limited"));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_timeout() {
        let store = Arc::new(MemoryStore::new());
        let wf = workflow(
            &store,
            StaticGenerator::text("late").with_delay(Duration::from_secs(120)),
        )
        .with_generation_timeout(Duration::from_secs(5));

        let err = wf
            .submit(None, Some(Upload::new("main.rs", "fn main() {}")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upstream(ref msg) if msg.contains("timed out after 5s")));
        assert!(store.records().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subsecond_timeout_message() {
        let store = Arc::new(MemoryStore::new());
        let wf = workflow(
            &store,
            StaticGenerator::text("late").with_delay(Duration::from_secs(1)),
        )
        .with_generation_timeout(Duration::from_millis(250));

        let err = wf
            .submit(None, Some(Upload::new("main.rs", "fn main() {}")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upstream(ref msg) if msg.ends_with("timed out after 250ms")));
    }

    #[tokio::test]
    async fn test_transient_store_failures_are_retried() {
        let store = Arc::new(MemoryStore::new());
        store
            .fail_next(2, StoreError::new(StoreErrorKind::Unavailable, "busy"))
            .await;
        let wf = workflow(&store, StaticGenerator::text("ok"));

        wf.submit(None, Some(Upload::new("main.rs", "fn main() {}")))
            .await
            .unwrap();

        assert_eq!(store.calls(), 3);
        assert_eq!(store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_is_persistence_error() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next(3, StoreError::other("disk I/O error")).await;
        let wf = workflow(&store, StaticGenerator::text("ok"));

        let err = wf
            .submit(None, Some(Upload::new("main.rs", "fn main() {}")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Persistence(ref msg) if msg == "disk I/O error"));
        assert_eq!(store.calls(), 3);
        assert!(store.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_owner_column_is_schema_mismatch() {
        let store = Arc::new(MemoryStore::new());
        store
            .fail_next(
                3,
                StoreError::new(
                    StoreErrorKind::MissingColumn("user_id".into()),
                    "table reviews has no column named user_id",
                ),
            )
            .await;
        let wf = workflow(&store, StaticGenerator::text("ok"));

        let err = wf
            .submit(
                Some(&UserId::from("alice")),
                Some(Upload::new("main.rs", "fn main() {}")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }
}
