//! Raw HTTP client for the Google Generative Language API.
//!
//! No orchestration awareness - just makes `generateContent` calls via
//! reqwest. Constrained decoding uses `generationConfig.responseMimeType`
//! plus a JSON response schema; the returned text is then parsed into the
//! structured slot on a best-effort basis.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::{GenerationClient, GenerationError, GenerationRequest, GenerationResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiClient {
    /// Create a client with the default Google endpoint.
    pub fn new(api_key: SecretString) -> Self {
        Self::with_http(Client::new(), api_key, DEFAULT_BASE_URL.to_owned())
    }

    /// Create a client with a custom base URL (mock servers in tests).
    pub fn with_base_url(api_key: SecretString, base_url: String) -> Self {
        Self::with_http(Client::new(), api_key, base_url)
    }

    /// Create a client around a preconfigured reqwest client (timeouts are
    /// the caller's concern; the core defines no timeout policy).
    pub fn with_http(http: Client, api_key: SecretString, base_url: String) -> Self {
        Self { http, api_key, base_url }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let constrained = request.response_schema.is_some();
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &request.prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: constrained.then_some("application/json"),
                response_schema: request.response_schema,
            },
        };

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_else(|_| "(no body)".to_owned());
            return Err(GenerationError::Api { status, message });
        }

        let decoded: GenerateContentResponse = response.json().await?;
        let raw_text = decoded.first_text().ok_or(GenerationError::EmptyResponse)?;

        // Constrained decoding is not always honored for every schema
        // shape; a missed parse here is what the validator's fallback
        // extraction path exists for.
        let structured =
            constrained.then(|| serde_json::from_str::<Value>(&raw_text).ok()).flatten();

        Ok(GenerationResult { structured, raw_text })
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text = candidate
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect::<String>();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}
