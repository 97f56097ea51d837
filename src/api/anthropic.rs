//! Anthropic Messages API client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::api::error::ProviderError;
use crate::api::CompletionModel;
use crate::config::ModelConfig;

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const PROVIDER_NAME: &str = "anthropic";

/// Anthropic API client for text completions
pub struct AnthropicClient {
    api_key: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

impl AnthropicClient {
    /// Create a client from model configuration
    pub fn new(config: &ModelConfig, request_timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("triager/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            client,
            base_url: ANTHROPIC_API_BASE.to_string(),
        })
    }

    /// Create a client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(
        config: &ModelConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut client = Self::new(config, Duration::from_secs(5))?;
        client.base_url = base_url.into();
        Ok(client)
    }
}

#[async_trait]
impl CompletionModel for AnthropicClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!(model = %self.model, "Anthropic completion request");

        let request_body = MessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            401 => return Err(ProviderError::unauthorized(PROVIDER_NAME)),
            403 => return Err(ProviderError::forbidden(PROVIDER_NAME)),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok());
                return Err(ProviderError::rate_limited(PROVIDER_NAME, retry_after));
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::http(PROVIDER_NAME, code, body));
            }
        }

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::http(PROVIDER_NAME, 0, format!("Parse error: {e}")))?;

        let text: String = message
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_key: &str) -> ModelConfig {
        ModelConfig {
            api_key: api_key.to_string(),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_provider_name() {
        let client = AnthropicClient::new(&test_config("test-key"), Duration::from_secs(5)).unwrap();
        assert_eq!(client.name(), "anthropic");
    }

    #[test]
    fn test_is_configured() {
        let client = AnthropicClient::new(&test_config("test-key"), Duration::from_secs(5)).unwrap();
        assert!(client.is_configured());

        let client = AnthropicClient::new(&test_config(""), Duration::from_secs(5)).unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn test_response_text_extraction() {
        let json = serde_json::json!({
            "content": [
                {"type": "text", "text": "As a user, I want to export quickly"},
                {"type": "tool_use", "id": "x", "name": "y", "input": {}},
                {"type": "text", "text": "Acceptance criteria follow"}
            ]
        });
        let message: MessageResponse = serde_json::from_value(json).unwrap();
        let text: String = message
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("\n");

        assert!(text.starts_with("As a user"));
        assert!(text.ends_with("follow"));
        assert!(!text.contains("tool_use"));
    }
}
