//! Gemini LLM client implementation (API key authentication).

use async_trait::async_trait;
use reqwest::Client;

use crate::config::GeminiConfig;
use crate::error::Error;
use crate::Result;

use super::types::{GeminiResponse, GenerateRequest, GenerationConfig, RequestContent, RequestPart};
use super::LlmClient;

/// Gemini API client using API key authentication.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    api_url: String,
    generation: GenerationConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration.
    pub fn new(config: &GeminiConfig, client: Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            generation: GenerationConfig::default(),
            client,
        }
    }

    fn build_url(&self) -> String {
        format!("{}/{}:generateContent", self.api_url, self.model)
    }

    fn parse_response(&self, response: GeminiResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::Llm("No candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(Error::Llm(format!("Empty response (finish reason: {})", reason)));
        }

        if let Some(usage) = response.usage_metadata {
            tracing::debug!(
                "Gemini usage: prompt={} completion={} total={}",
                usage.prompt_token_count.unwrap_or(0),
                usage.candidates_token_count.unwrap_or(0),
                usage.total_token_count.unwrap_or(0)
            );
        }

        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.generation.clone(),
        };

        tracing::debug!("Calling Gemini model {}", self.model);

        let response = self
            .client
            .post(self.build_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::Llm(format!("Gemini API error: {}", error_text)));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        self.parse_response(gemini_response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
        let config = GeminiConfig {
            api_key: "gem-key".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_url: format!("{}/v1beta/models", server.url()),
        };
        GeminiClient::new(&config, Client::new())
    }

    #[tokio::test]
    async fn test_generate_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "gem-key".into()))
            .match_body(Matcher::PartialJsonString(
                r#"{"generationConfig":{"topK":40,"maxOutputTokens":1024}}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Summary: "},{"text":"reply today."}]},"finishReason":"STOP"}]}"#)
            .create_async()
            .await;

        let text = client_for(&server).generate("Analyze this email").await.unwrap();
        assert_eq!(text, "Summary: reply today.");
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"message":"API key not valid"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_generate_no_candidates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert!(err.to_string().contains("No candidates"));
    }
}
