use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::parsing::{parse_fields_json, ParsedResponse};
use super::prompts::{field_extraction_user_prompt, FIELD_EXTRACTION_SYSTEM_PROMPT};
use super::FieldExtractor;
use crate::error::ExtractError;

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Self {
        // Local models can be slow; allow generous timeouts
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    async fn complete(&self, system: &str, user_message: &str) -> Result<String, ExtractError> {
        let request = OllamaChatRequest {
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
            stream: false,
            options: OllamaOptions { temperature: 0.1 },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ExtractError::Network(format!(
                    "Ollama request failed: {}. Is Ollama running? (try: ollama serve)",
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractError::Network(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::Network(format!("invalid Ollama response body: {}", e)))?;

        Ok(response.message.content)
    }
}

#[async_trait]
impl FieldExtractor for OllamaProvider {
    async fn extract_fields(&self, first_page: &str) -> Result<ParsedResponse, ExtractError> {
        let user_prompt = field_extraction_user_prompt(first_page);
        let response = self
            .complete(FIELD_EXTRACTION_SYSTEM_PROMPT, &user_prompt)
            .await?;

        Ok(parse_fields_json(&response))
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let provider = OllamaProvider::new("http://localhost:11434/", "mistral");
        assert_eq!(provider.base_url, "http://localhost:11434");
    }
}
