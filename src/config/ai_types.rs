// AI configuration type definitions

use serde::Deserialize;

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

/// Default max tokens for Anthropic responses (suggestions are short)
fn default_max_tokens() -> u32 {
    512
}

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderType {
    #[default]
    OpenAi,
    Anthropic,
}

impl AiProviderType {
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProviderType::OpenAi => "OpenAI",
            AiProviderType::Anthropic => "Anthropic",
        }
    }
}

/// OpenAI-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// API key for OpenAI (a blank key leaves the engine unconfigured)
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            model: default_openai_model(),
        }
    }
}

/// Anthropic-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_anthropic_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        AnthropicConfig {
            api_key: None,
            model: default_anthropic_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// AI provider configuration section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AiConfig {
    /// Which AI provider to use
    #[serde(default)]
    pub provider: AiProviderType,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

impl AiConfig {
    /// API key of the selected provider, if it is present and not blank
    pub fn credential(&self) -> Option<&str> {
        let key = match self.provider {
            AiProviderType::OpenAi => self.openai.api_key.as_deref(),
            AiProviderType::Anthropic => self.anthropic.api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
#[path = "ai_types_tests.rs"]
mod ai_types_tests;
