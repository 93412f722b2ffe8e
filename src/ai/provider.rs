//! AI provider abstraction
//!
//! Defines the CompletionProvider trait, AiError types, and the AsyncAiProvider
//! factory for creating provider instances from configuration. Providers make a
//! single non-streaming request per prompt; retries are left to callers.

use std::future::Future;

use thiserror::Error;

use crate::config::ai_types::{AiConfig, AiProviderType};

mod async_anthropic;
mod async_openai;

pub use async_anthropic::AsyncAnthropicClient;
pub use async_openai::AsyncOpenAiClient;

/// Errors that can occur during AI operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    /// AI is not configured (missing API key)
    #[error("[{provider}] AI not configured: {message}")]
    NotConfigured { provider: String, message: String },

    /// Network error during API request
    #[error("[{provider}] Network error: {message}")]
    Network { provider: String, message: String },

    /// API returned an error response
    #[error("[{provider}] API error ({code}): {message}")]
    Api {
        provider: String,
        code: u16,
        message: String,
    },

    /// Failed to parse API response
    #[error("[{provider}] Parse error: {message}")]
    Parse { provider: String, message: String },

    /// API answered without any generated text
    #[error("[{provider}] Empty response")]
    EmptyResponse { provider: String },
}

/// One generation request: fixed system instruction plus the built prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}

/// Something that turns a prompt into generated text
pub trait CompletionProvider: Send + Sync + 'static {
    /// Display name used in logs and errors
    fn provider_name(&self) -> &'static str;

    /// Generate text for `request`. Empty output is an error.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, AiError>> + Send;
}

/// Async AI provider implementations
#[derive(Debug, Clone)]
pub enum AsyncAiProvider {
    /// OpenAI Chat Completions API
    OpenAi(AsyncOpenAiClient),
    /// Anthropic Messages API
    Anthropic(AsyncAnthropicClient),
}

impl AsyncAiProvider {
    /// Create an async AI provider from configuration
    ///
    /// Returns an error if the selected provider has no usable API key
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let provider_name = config.provider.display_name();
        let api_key = config
            .credential()
            .ok_or_else(|| AiError::NotConfigured {
                provider: provider_name.to_string(),
                message: format!(
                    "Missing API key. Add 'api_key' in [ai.{}] section of the config file.",
                    provider_name.to_lowercase()
                ),
            })?
            .to_string();

        let provider = match config.provider {
            AiProviderType::OpenAi => AsyncAiProvider::OpenAi(AsyncOpenAiClient::new(
                api_key,
                config.openai.model.clone(),
            )),
            AiProviderType::Anthropic => AsyncAiProvider::Anthropic(AsyncAnthropicClient::new(
                api_key,
                config.anthropic.model.clone(),
                config.anthropic.max_tokens,
            )),
        };

        Ok(provider)
    }
}

impl CompletionProvider for AsyncAiProvider {
    fn provider_name(&self) -> &'static str {
        match self {
            AsyncAiProvider::OpenAi(_) => "OpenAI",
            AsyncAiProvider::Anthropic(_) => "Anthropic",
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        match self {
            AsyncAiProvider::OpenAi(client) => client.complete(request).await,
            AsyncAiProvider::Anthropic(client) => client.complete(request).await,
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
