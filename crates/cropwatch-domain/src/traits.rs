//! Trait definitions for external interactions
//!
//! These traits define the boundary between the extraction logic and the
//! model backends. Implementations live in `cropwatch-llm`.

use crate::field::ImageAttachment;
use async_trait::async_trait;

/// A single call to a text or vision model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Prompt text
    pub prompt: String,
    /// Optional image sent with the prompt
    pub image: Option<ImageAttachment>,
}

impl GenerationRequest {
    /// Text-only request
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    /// Attach an image
    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (cropwatch-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::fmt::Display + Send;

    /// Generate the raw text answer for a request
    async fn generate(&self, request: &GenerationRequest) -> Result<String, Self::Error>;

    /// Name of the model behind this provider
    fn model_name(&self) -> &str;
}
