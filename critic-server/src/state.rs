//! Shared state handed to every handler

use std::sync::Arc;

use critic_core::{Environment, RetrievalWorkflow, SubmissionWorkflow};

use crate::auth::TokenAuthority;
use crate::error::{ApiError, Operation};

/// Application state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub submission: SubmissionWorkflow,
    pub retrieval: RetrievalWorkflow,
    pub auth: Arc<TokenAuthority>,
    pub environment: Environment,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        submission: SubmissionWorkflow,
        retrieval: RetrievalWorkflow,
        auth: Arc<TokenAuthority>,
    ) -> Self {
        Self {
            submission,
            retrieval,
            auth,
            environment: Environment::default(),
            max_upload_bytes: 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Wrap a workflow failure, exposing details outside production
    pub fn error(&self, operation: Operation, source: critic_core::Error) -> ApiError {
        ApiError::core(operation, source, !self.environment.is_production())
    }
}
