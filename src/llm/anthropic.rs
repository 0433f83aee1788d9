use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::parsing::{parse_fields_json, ParsedResponse};
use super::prompts::{field_extraction_user_prompt, FIELD_EXTRACTION_SYSTEM_PROMPT};
use super::FieldExtractor;
use crate::error::ExtractError;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!(
                "Anthropic API key is required. Set ANTHROPIC_API_KEY environment variable."
            );
        }

        Ok(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url
                .unwrap_or("https://api.anthropic.com")
                .trim_end_matches('/')
                .to_string(),
        })
    }

    async fn complete(&self, system: &str, user_message: &str) -> Result<String, ExtractError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1500,
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user_message.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::Network(format!("Anthropic request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractError::Network(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let response: AnthropicResponse = response.json().await.map_err(|e| {
            ExtractError::Network(format!("invalid Anthropic response body: {}", e))
        })?;

        response
            .content
            .first()
            .and_then(|c| c.text.clone())
            .ok_or_else(|| ExtractError::Network("no text content in Anthropic response".to_string()))
    }
}

#[async_trait]
impl FieldExtractor for AnthropicProvider {
    async fn extract_fields(&self, first_page: &str) -> Result<ParsedResponse, ExtractError> {
        let user_prompt = field_extraction_user_prompt(first_page);
        let response = self
            .complete(FIELD_EXTRACTION_SYSTEM_PROMPT, &user_prompt)
            .await?;

        Ok(parse_fields_json(&response))
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_api_key() {
        assert!(AnthropicProvider::new("", "claude-sonnet-4-20250514", None).is_err());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let provider = AnthropicProvider::new(
            "sk-ant-test",
            "claude-sonnet-4-20250514",
            Some("https://proxy.example.com/"),
        )
        .unwrap();
        assert_eq!(provider.base_url, "https://proxy.example.com");
    }
}
