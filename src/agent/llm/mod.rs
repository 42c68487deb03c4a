//! LLM client abstraction layer.
//!
//! This module provides:
//! - [`LlmClient`] trait for swappable LLM providers
//! - [`GeminiClient`], the Gemini API key implementation

mod types;

use async_trait::async_trait;

use crate::Result;

pub mod gemini;

pub use gemini::GeminiClient;
pub use types::GenerationConfig;

/// LLM client trait: swappable provider abstraction.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate text for a single prompt and return it verbatim.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model name used for requests.
    fn model(&self) -> &str;
}

/// Fake LLM client for testing.
#[cfg(test)]
pub struct FakeLlmClient {
    responses: std::sync::Mutex<std::collections::VecDeque<String>>,
    prompts: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl FakeLlmClient {
    /// Create with predefined text responses.
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        responses
            .pop_front()
            .ok_or_else(|| crate::error::Error::Llm("No more fake responses".to_string()))
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}
