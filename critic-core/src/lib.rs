//! Critic Core - review workflows for the Critic code review service
//!
//! An uploaded source file is sent to a text-generation capability, the answer
//! is split into a summary and suggestions, and the result is stored through a
//! persistence gateway. Stored reviews are read back with ownership checks.
//! Both the generator and the store are traits so callers can inject their own.

pub mod config;
pub mod error;
pub mod generation;
pub mod retry;
pub mod review;
pub mod secrets;
pub mod store;
pub mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{Config, Environment};
pub use error::{Error, Result};
pub use generation::{GenerationOutput, ReviewGenerator, TokenUsage};
pub use retry::RetryPolicy;
pub use review::{NewReview, ReviewId, ReviewRecord, SubmittedReview, Upload, UserId};
pub use secrets::Secrets;
pub use store::{ReviewStore, StoreError, StoreErrorKind, StoreResult};
pub use workflow::{RetrievalWorkflow, SubmissionWorkflow};
