//! Amazon Bedrock client

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::ModelInvoker;

/// Default region for the Bedrock runtime
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default hosted model
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";

/// Default cap on generated answer length
pub const DEFAULT_MAX_TOKENS: u32 = 512;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Which model to call and how
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub region: String,
    pub model_id: String,
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Build the Anthropic-on-Bedrock request envelope
pub fn request_body(prompt: &str, max_tokens: u32) -> Value {
    json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": max_tokens,
        "messages": [
            {"role": "user", "content": [{"type": "text", "text": prompt}]}
        ]
    })
}

/// Pull the answer text out of a response body.
///
/// Returns the first content segment's text when the envelope has the
/// expected shape, and the raw body otherwise.
pub fn extract_answer(body: &[u8]) -> String {
    let Ok(parsed) = serde_json::from_slice::<Value>(body) else {
        return String::from_utf8_lossy(body).into_owned();
    };

    let first = parsed
        .get("content")
        .and_then(Value::as_array)
        .and_then(|content| content.first())
        .and_then(Value::as_object);

    match first.map(|segment| segment.get("text")) {
        Some(None) => String::new(),
        Some(Some(Value::String(text))) => text.clone(),
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Model invoker backed by the Bedrock runtime `InvokeModel` call
pub struct BedrockInvoker {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
    max_tokens: u32,
}

impl BedrockInvoker {
    /// Create an invoker using the ambient AWS credential chain
    pub async fn new(settings: &ModelSettings) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        info!(
            region = %settings.region,
            model_id = %settings.model_id,
            max_tokens = settings.max_tokens,
            "bedrock client ready"
        );

        Self {
            client: aws_sdk_bedrockruntime::Client::new(&sdk_config),
            model_id: settings.model_id.clone(),
            max_tokens: settings.max_tokens,
        }
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let payload = serde_json::to_vec(&request_body(prompt, self.max_tokens))
            .context("Failed to encode model request")?;

        debug!(model_id = %self.model_id, bytes = payload.len(), "invoking model");

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| {
                anyhow!(
                    "Bedrock invoke_model failed for {}: {}",
                    self.model_id,
                    DisplayErrorContext(&e)
                )
            })?;

        Ok(extract_answer(response.body().as_ref()))
    }
}
