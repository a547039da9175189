//! Text-generation capability that writes the reviews

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Token accounting reported by a generator, when available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// What a generator hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutput {
    /// Bare review text
    Plain(String),
    /// Review text with provider metadata attached
    Structured {
        text: Option<String>,
        model: Option<String>,
        usage: Option<TokenUsage>,
    },
}

impl GenerationOutput {
    /// Extract the review text, rejecting outputs with nothing to parse
    pub fn into_text(self) -> Result<String> {
        let text = match self {
            GenerationOutput::Plain(text) => Some(text),
            GenerationOutput::Structured { text, .. } => text,
        };

        match text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(Error::Upstream(
                "generator returned no review text".to_string(),
            )),
        }
    }
}

impl From<String> for GenerationOutput {
    fn from(text: String) -> Self {
        GenerationOutput::Plain(text)
    }
}

/// Produces a review for a piece of source code
#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Review `source`. Failures should be reported as [`Error::Upstream`].
    async fn review_code(&self, source: &str) -> Result<GenerationOutput>;
}
