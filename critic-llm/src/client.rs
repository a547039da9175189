//! Groq chat-completions client

use async_trait::async_trait;
use critic_core::config::GenerationConfig;
use critic_core::{GenerationOutput, ReviewGenerator, Secrets, TokenUsage};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl From<ChatResponse> for GenerationOutput {
    fn from(response: ChatResponse) -> Self {
        GenerationOutput::Structured {
            text: response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content),
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        }
    }
}

/// Client for Groq's OpenAI-compatible API
pub struct GroqClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqClient {
    /// Create a client from generation settings and an API key
    pub fn new(config: &GenerationConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::MissingKey);
        }

        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            config.api_url.trim_end_matches('/')
        ))
        .map_err(|e| Error::Config(format!("invalid api_url '{}': {}", config.api_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("critic/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(endpoint = %endpoint, model = %config.model, "Created Groq client");

        Ok(Self {
            http,
            endpoint,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Create a client using the API key from secrets
    ///
    /// Key is loaded from (in priority order):
    /// 1. GROQ_API_KEY environment variable
    /// 2. ~/.config/critic/secrets.toml
    pub fn from_secrets(config: &GenerationConfig, secrets: &Secrets) -> Result<Self> {
        let api_key = secrets.groq_api_key().ok_or(Error::MissingKey)?;
        Self::new(config, api_key)
    }

    /// Get the chat-completions endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the configured model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model to review `source`
    pub async fn complete(&self, source: &str) -> Result<GenerationOutput> {
        let user = user_prompt(source);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, source_bytes = source.len(), "Requesting review");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            warn!(status = status.as_u16(), "Generation API returned an error");

            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(text),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(text),
                _ => Error::Api {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to parse completion response: {}", e)))?;

        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Review generated"
            );
        }

        Ok(body.into())
    }
}

#[async_trait]
impl ReviewGenerator for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn review_code(&self, source: &str) -> critic_core::Result<GenerationOutput> {
        Ok(self.complete(source).await?)
    }
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
