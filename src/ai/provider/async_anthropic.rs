//! Async Anthropic Claude API client
//!
//! Implements a single-shot request to the Anthropic Messages API.
//! Uses reqwest for HTTP and tokio for async runtime.

use reqwest::Client;
use serde::Deserialize;

use super::{AiError, CompletionRequest};

/// Anthropic API endpoint
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header
const ANTHROPIC_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "Anthropic";

/// Async Anthropic Claude API client
#[derive(Debug, Clone)]
pub struct AsyncAnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AsyncAnthropicClient {
    /// Create a new async Anthropic client
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            max_tokens,
        }
    }

    fn build_request_body(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": request.system,
            "messages": [
                {
                    "role": "user",
                    "content": request.prompt
                }
            ]
        });

        serde_json::to_string(&request_body).map_err(|e| AiError::Parse {
            provider: PROVIDER.to_string(),
            message: e.to_string(),
        })
    }

    /// Join the text blocks of a Messages API response
    fn parse_response_body(body: &str) -> Result<String, AiError> {
        let response: MessagesResponse =
            serde_json::from_str(body).map_err(|e| AiError::Parse {
                provider: PROVIDER.to_string(),
                message: e.to_string(),
            })?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse {
                provider: PROVIDER.to_string(),
            });
        }
        Ok(text)
    }

    /// Request a completion from the Anthropic API
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let body = self.build_request_body(request)?;

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| AiError::Network {
                provider: PROVIDER.to_string(),
                message: e.to_string(),
            })?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AiError::Api {
                provider: PROVIDER.to_string(),
                code,
                message,
            });
        }

        let text = response.text().await.map_err(|e| AiError::Network {
            provider: PROVIDER.to_string(),
            message: e.to_string(),
        })?;

        Self::parse_response_body(&text)
    }
}

#[cfg(test)]
#[path = "async_anthropic_tests.rs"]
mod async_anthropic_tests;
