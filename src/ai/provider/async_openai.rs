//! Async OpenAI API client
//!
//! Implements a single-shot request to the OpenAI Chat Completions API.
//! Uses reqwest for HTTP and tokio for async runtime.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiError, CompletionRequest};

/// OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

const PROVIDER: &str = "OpenAI";

/// Async OpenAI API client
#[derive(Debug, Clone)]
pub struct AsyncOpenAiClient {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl AsyncOpenAiClient {
    /// Create a new async OpenAI client
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    /// Returns the stored model (used in tests)
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request body JSON for OpenAI Chat Completions API
    ///
    /// Sends the system instruction and prompt as two messages. Does not set
    /// max_tokens, allowing OpenAI to use its default.
    fn build_request_body(&self, request: &CompletionRequest) -> Result<String, AiError> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'static str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct RequestBody<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
        }

        let body = RequestBody {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.prompt,
                },
            ],
        };

        serde_json::to_string(&body).map_err(|e| AiError::Parse {
            provider: PROVIDER.to_string(),
            message: format!("Failed to serialize request body: {}", e),
        })
    }

    /// Extract the first choice's message content
    fn parse_response_body(body: &str) -> Result<String, AiError> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| AiError::Parse {
            provider: PROVIDER.to_string(),
            message: e.to_string(),
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AiError::EmptyResponse {
                provider: PROVIDER.to_string(),
            })
    }

    /// Request a completion from the OpenAI API
    ///
    /// # Returns
    /// * `Ok(String)` - Generated text
    /// * `Err(AiError::*)` - Transport, status, parse or empty-content errors
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let body = self.build_request_body(request)?;

        let response = self
            .client
            .post(OPENAI_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| AiError::Network {
                provider: PROVIDER.to_string(),
                message: e.to_string(),
            })?;

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

        log::debug!("OpenAI response received ({} bytes)", text.len());
        Self::parse_response_body(&text)
    }
}

#[cfg(test)]
#[path = "async_openai_tests.rs"]
mod async_openai_tests;
