//! Generation-service boundary: one call, no retries, no backoff.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from the generation boundary. The runner maps these into
/// `AgentError::GenerationFailed`, naming the agent that was running.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("generation response contained no candidates")]
    EmptyResponse,
}

/// A single generation call.
///
/// `response_schema` switches the call into schema-constrained mode: the
/// service is asked to decode directly into the expected structure. Without
/// it the call is plain free text.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    pub fn free_text(prompt: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature: temperature.clamp(0.0, 1.0),
            response_schema: None,
        }
    }

    pub fn constrained(
        prompt: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        response_schema: Value,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature: temperature.clamp(0.0, 1.0),
            response_schema: Some(response_schema),
        }
    }
}

/// Outcome of one generation call. `structured` is populated only when the
/// service honored a constrained-decoding request; `raw_text` is always
/// present so the fallback extraction path has something to work with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationResult {
    pub structured: Option<Value>,
    pub raw_text: String,
}

impl GenerationResult {
    pub fn text(raw_text: impl Into<String>) -> Self {
        Self { structured: None, raw_text: raw_text.into() }
    }

    pub fn structured(value: Value) -> Self {
        let raw_text = value.to_string();
        Self { structured: Some(value), raw_text }
    }
}

/// Injectable handle on the text-generation service.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest)
        -> Result<GenerationResult, GenerationError>;
}
