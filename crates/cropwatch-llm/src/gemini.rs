//! Gemini Provider Implementation
//!
//! Integration with Google's Gemini `generateContent` API, used for both
//! text prompts and photo analysis.
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - Inline image parts for vision requests
//! - Retry with exponential backoff on transport errors, 429 and 5xx
//! - Request timeout
//!
//! # Examples
//!
//! ```no_run
//! use cropwatch_llm::GeminiProvider;
//!
//! let provider = GeminiProvider::new("my-api-key").unwrap();
//! let provider = GeminiProvider::from_env().unwrap().with_model("gemini-1.5-pro");
//! ```

use crate::LlmError;
use async_trait::async_trait;
use cropwatch_domain::{GenerationRequest, LlmProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound on a single backoff delay
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Gemini API provider
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    backoff_base: Duration,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, empty when absent
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }
}

impl GeminiProvider {
    /// Create a provider with the default endpoint and model
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_secs(1),
        })
    }

    /// Create a provider using the key in `GEMINI_API_KEY`
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(API_KEY_ENV.to_string()))?;
        Self::new(api_key)
    }

    /// Use a different API endpoint (base URL without the `/models` path)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the first backoff delay; later delays double
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Exponential backoff after the given failed attempt: base, 2x base,
    /// 4x base, ... capped at `MAX_BACKOFF`
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor).min(MAX_BACKOFF)
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn send_once(&self, body: &GenerateContentRequest<'_>) -> Attempt {
        let response = match self
            .client
            .post(self.url())
            .query(&[("key", &self.api_key)])
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Retry(LlmError::Communication(format!("Request failed: {}", e)))
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<GenerateContentResponse>().await {
                Ok(parsed) => Attempt::Done(Ok(parsed.into_text())),
                Err(e) => Attempt::Done(Err(LlmError::InvalidResponse(format!(
                    "Failed to parse response: {}",
                    e
                )))),
            };
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Attempt::Retry(LlmError::RateLimitExceeded)
        } else if status.is_server_error() {
            Attempt::Retry(LlmError::Communication(format!("HTTP {}: {}", status, error_text)))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Attempt::Done(Err(LlmError::ModelNotAvailable(self.model.clone())))
        } else {
            Attempt::Done(Err(LlmError::Communication(format!(
                "Gemini API error: HTTP {}: {}",
                status, error_text
            ))))
        }
    }
}

enum Attempt {
    Done(Result<String, LlmError>),
    Retry(LlmError),
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    type Error = LlmError;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, Self::Error> {
        let mut parts = vec![Part::Text {
            text: &request.prompt,
        }];
        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            });
        }
        let body = GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.send_once(&body).await {
                Attempt::Done(result) => {
                    if let Ok(text) = &result {
                        debug!("Gemini response: {} chars", text.len());
                    }
                    return result;
                }
                Attempt::Retry(e) => {
                    warn!("Gemini attempt {} failed: {}", attempts + 1, e);
                    last_error = Some(e);
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                tokio::time::sleep(self.backoff_delay(attempts)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new("key").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model, DEFAULT_MODEL);
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_builder_overrides() {
        let provider = GeminiProvider::new("key")
            .unwrap()
            .with_endpoint("http://localhost:9999/")
            .with_model("gemini-1.5-pro")
            .with_max_retries(0);
        assert_eq!(provider.url(), "http://localhost:9999/models/gemini-1.5-pro:generateContent");
        assert_eq!(provider.max_retries, 1);
        assert_eq!(provider.model_name(), "gemini-1.5-pro");
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let provider = GeminiProvider::new("key")
            .unwrap()
            .with_backoff_base(Duration::from_millis(500));
        assert_eq!(provider.backoff_delay(1), Duration::from_millis(500));
        assert_eq!(provider.backoff_delay(2), Duration::from_secs(1));
        assert_eq!(provider.backoff_delay(3), Duration::from_secs(2));
        assert_eq!(provider.backoff_delay(33), MAX_BACKOFF);
        assert_eq!(provider.backoff_delay(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text { text: "describe" },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg",
                            data: "AAAA",
                        },
                    },
                ],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "describe" },
                        { "inline_data": { "mime_type": "image/jpeg", "data": "AAAA" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_response_text_defaults_to_empty() {
        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.into_text(), "");

        let no_text: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "content": { "parts": [{}] } }] }))
                .unwrap();
        assert_eq!(no_text.into_text(), "");

        let full: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "hello" }] } }]
        }))
        .unwrap();
        assert_eq!(full.into_text(), "hello");
    }
}
