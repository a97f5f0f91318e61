//! Text-generation client for kubeask
//!
//! This crate builds the cluster prompt, talks to Amazon Bedrock using the
//! Anthropic message schema, and pulls the answer text out of the response.

mod bedrock;
mod prompt;

use anyhow::Result;
use async_trait::async_trait;

pub use bedrock::{BedrockInvoker, ModelSettings, extract_answer, request_body};
pub use prompt::{FALLBACK_ANSWER, build_prompt};

/// A hosted model that turns a prompt into answer text
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Send one prompt and return the answer text.
    ///
    /// Only transport failures are errors; an unexpected response shape is
    /// returned as raw text.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}
