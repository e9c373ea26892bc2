//! LLM provider trait for generating answers

use async_trait::async_trait;

use crate::config::GenerationConfig;
use crate::error::Result;

/// Sampling parameters for a single generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Output length bound
    pub max_tokens: u32,
    pub temperature: f32,
    /// Always 1: a single candidate is requested
    pub candidate_count: u32,
}

impl GenerationParams {
    /// Build parameters from generation config
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            candidate_count: 1,
        }
    }
}

/// Trait for prompt-to-text generation
///
/// Implementations:
/// - `GeminiClient`: Google Gemini `generateContent`
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a fully assembled prompt
    ///
    /// May return an empty string when the backend produced no text.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
