mod anthropic;
mod ollama;
mod openai;
pub(crate) mod parsing;
mod prompts;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::cli::LlmProvider;
use crate::config::Config;
use crate::error::ExtractError;

pub use parsing::{ParsedFields, ParsedResponse};

/// Trait for LLM providers performing field extraction
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Extract bibliographic fields from first-page text. One completion
    /// call per document; the result is tagged so callers pattern-match on
    /// parse failures instead of probing field by field.
    async fn extract_fields(&self, first_page: &str) -> Result<ParsedResponse, ExtractError>;

    /// Get the provider name
    #[allow(dead_code)]
    fn name(&self) -> &'static str;
}

/// Main LLM client that abstracts over providers
pub struct LlmClient {
    provider: Box<dyn FieldExtractor>,
}

impl LlmClient {
    /// Create a new LLM client for the specified provider.
    ///
    /// Fails at startup when the provider is not configured or its API key
    /// resolves to empty.
    pub fn new(
        provider: LlmProvider,
        config: &Config,
        model_override: Option<&str>,
    ) -> Result<Self> {
        let provider_impl: Box<dyn FieldExtractor> = match provider {
            LlmProvider::OpenAI => {
                let provider_config = config
                    .get_provider("openai")
                    .context("OpenAI provider not configured")?;
                let model = model_override
                    .map(String::from)
                    .or_else(|| provider_config.model.clone())
                    .unwrap_or_else(|| "gpt-4o-mini".to_string());
                Box::new(openai::OpenAIProvider::new(
                    &provider_config.api_key,
                    &model,
                    provider_config.base_url.as_deref(),
                )?)
            }
            LlmProvider::Anthropic => {
                let provider_config = config
                    .get_provider("anthropic")
                    .context("Anthropic provider not configured")?;
                let model = model_override
                    .map(String::from)
                    .or_else(|| provider_config.model.clone())
                    .unwrap_or_else(|| "claude-sonnet-4-20250514".to_string());
                Box::new(anthropic::AnthropicProvider::new(
                    &provider_config.api_key,
                    &model,
                    provider_config.base_url.as_deref(),
                )?)
            }
            LlmProvider::Ollama => {
                let provider_config = config
                    .get_provider("ollama")
                    .context("Ollama provider not configured")?;
                let model = model_override
                    .map(String::from)
                    .or_else(|| provider_config.model.clone())
                    .unwrap_or_else(|| "mistral".to_string());
                let base_url = provider_config
                    .base_url
                    .as_deref()
                    .unwrap_or("http://localhost:11434");
                Box::new(ollama::OllamaProvider::new(base_url, &model))
            }
        };

        Ok(Self {
            provider: provider_impl,
        })
    }

    /// Build a client around an arbitrary extractor (used by pipeline tests).
    #[cfg(test)]
    pub fn from_provider(provider: Box<dyn FieldExtractor>) -> Self {
        Self { provider }
    }

    /// Extract bibliographic fields from first-page text
    pub async fn extract_fields(&self, first_page: &str) -> Result<ParsedResponse, ExtractError> {
        self.provider.extract_fields(first_page).await
    }

    /// Get the provider name
    #[allow(dead_code)]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}
