//! Review records and generated-text handling
//!
//! A review is produced by sending an uploaded source file to the generation
//! capability and splitting its answer into a summary and a suggestions section.

pub mod parser;
pub mod record;

pub use parser::{parse_review, ParsedReview, SUGGESTIONS_LABEL};
pub use record::{NewReview, ReviewId, ReviewRecord, SubmittedReview, Upload, UserId};
