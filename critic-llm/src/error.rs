//! Error types for generation API calls

use thiserror::Error;

/// Result type for generation API calls
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while asking the API for a review
#[derive(Error, Debug)]
pub enum Error {
    /// Non-success response from the API
    #[error("Generation API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication error
    #[error("Generation API authentication error: {0}")]
    Auth(String),

    /// No API key configured
    #[error("Groq API key not found. Set GROQ_API_KEY or add it to ~/.config/critic/secrets.toml")]
    MissingKey,

    /// Rate limit exceeded
    #[error("Generation API rate limit exceeded: {0}")]
    RateLimited(String),

    /// Transport failure
    #[error("Generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid client settings
    #[error("Invalid generation settings: {0}")]
    Config(String),
}

impl From<Error> for critic_core::Error {
    fn from(err: Error) -> Self {
        critic_core::Error::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_upstream() {
        let err: critic_core::Error = Error::Api {
            status: 503,
            message: "over capacity".into(),
        }
        .into();

        match err {
            critic_core::Error::Upstream(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("over capacity"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
