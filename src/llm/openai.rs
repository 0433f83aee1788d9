use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::parsing::{parse_fields_json, ParsedResponse};
use super::prompts::{field_extraction_user_prompt, FIELD_EXTRACTION_SYSTEM_PROMPT};
use super::FieldExtractor;
use crate::error::ExtractError;

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAIProvider {
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("OpenAI API key is required. Set OPENAI_API_KEY environment variable.");
        }

        Ok(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.unwrap_or("https://api.openai.com/v1").to_string(),
        })
    }

    async fn complete(&self, system: &str, user_message: &str) -> Result<String, ExtractError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            max_tokens: 1500,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::Network(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractError::Network(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Network(format!("invalid OpenAI response body: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ExtractError::Network("no content in OpenAI response".to_string()))
    }
}

#[async_trait]
impl FieldExtractor for OpenAIProvider {
    async fn extract_fields(&self, first_page: &str) -> Result<ParsedResponse, ExtractError> {
        let user_prompt = field_extraction_user_prompt(first_page);
        let response = self
            .complete(FIELD_EXTRACTION_SYSTEM_PROMPT, &user_prompt)
            .await?;

        Ok(parse_fields_json(&response))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_api_key() {
        assert!(OpenAIProvider::new("", "gpt-4o-mini", None).is_err());
    }

    #[test]
    fn test_new_accepts_custom_base_url() {
        let provider =
            OpenAIProvider::new("sk-test", "gpt-4o-mini", Some("http://localhost:8000/v1"))
                .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
    }
}
