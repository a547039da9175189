//! In-memory stand-ins for the store and the generator
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream test suites.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::generation::{GenerationOutput, ReviewGenerator};
use crate::review::{NewReview, ReviewId, ReviewRecord, UserId};
use crate::store::{ReviewStore, StoreError, StoreResult};
use crate::{Error, Result};

/// Store that keeps records in a vector and can be told to fail
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ReviewRecord>>,
    failures: Mutex<VecDeque<StoreError>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `count` copies of `error`; each store call pops one before doing any work
    pub async fn fail_next(&self, count: usize, error: StoreError) {
        let mut failures = self.failures.lock().await;
        failures.extend(std::iter::repeat(error).take(count));
    }

    /// Seed a record as-is
    pub async fn push(&self, record: ReviewRecord) {
        self.records.lock().await.push(record);
    }

    /// All stored records in insertion order
    pub async fn records(&self) -> Vec<ReviewRecord> {
        self.records.lock().await.clone()
    }

    /// Number of store calls made, including failed ones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn check_failure(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn insert(&self, review: NewReview) -> StoreResult<ReviewRecord> {
        self.check_failure().await?;
        let record = ReviewRecord {
            id: ReviewId::new(),
            filename: review.filename,
            review_summary: review.review_summary,
            suggestions: review.suggestions,
            user_id: review.user_id,
            created_at: Utc::now(),
        };
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn list_by_owner(&self, owner: Option<&UserId>) -> StoreResult<Vec<ReviewRecord>> {
        self.check_failure().await?;
        let Some(owner) = owner else {
            return Ok(Vec::new());
        };
        let mut matching: Vec<ReviewRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.user_id.as_ref() == Some(owner))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn get(&self, id: &ReviewId) -> StoreResult<Option<ReviewRecord>> {
        self.check_failure().await?;
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }
}

/// Generator that answers every request with the same output
#[derive(Debug)]
pub struct StaticGenerator {
    response: std::result::Result<GenerationOutput, String>,
    delay: Option<Duration>,
    sources: Mutex<Vec<String>>,
}

impl StaticGenerator {
    /// Always answer with `text`
    pub fn text(text: impl Into<String>) -> Self {
        Self::output(GenerationOutput::Plain(text.into()))
    }

    /// Always answer with `output`
    pub fn output(output: GenerationOutput) -> Self {
        Self {
            response: Ok(output),
            delay: None,
            sources: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with an upstream error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            delay: None,
            sources: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Source texts received so far
    pub async fn sources(&self) -> Vec<String> {
        self.sources.lock().await.clone()
    }
}

#[async_trait]
impl ReviewGenerator for StaticGenerator {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn review_code(&self, source: &str) -> Result<GenerationOutput> {
        self.sources.lock().await.push(source.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone().map_err(Error::Upstream)
    }
}
