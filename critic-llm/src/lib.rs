//! Critic LLM - review generation through Groq
//!
//! Sends a source file to Groq's OpenAI-compatible chat-completions API and
//! hands the answer back as a [`critic_core::GenerationOutput`].

mod client;
mod error;
pub mod prompt;

pub use client::GroqClient;
pub use error::{Error, Result};
