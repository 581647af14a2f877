//! OpenRouter Provider - OpenAI-compatible gateway

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::openai::{http_client, send_completion, ChatRequest};
use crate::infrastructure::llm::{CompletionOptions, LLMMessage, LLMResponse, LLMError, LLMResult, LLM};

const REFERER: &str = "https://github.com/AgroBot/AgroBot";
const TITLE: &str = "AgroBot";

/// OpenRouter provider
pub struct OpenRouterProvider {
    api_key: String,
    client: Client,
    base: String,
    model: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: impl Into<String>, base: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            client: http_client(timeout),
            base: base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Get base URL for API
    fn base_url(&self) -> String {
        format!("{}/chat/completions", self.base)
    }
}

/// OpenRouter namespaces OpenAI models by vendor
pub fn route_model(model: &str) -> String {
    if model == "gpt-4o" {
        "openai/gpt-4o".to_string()
    } else {
        model.to_string()
    }
}

#[async_trait]
impl LLM for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn chat(&self, messages: Vec<LLMMessage>, options: &CompletionOptions) -> LLMResult<LLMResponse> {
        if self.api_key.is_empty() {
            return Err(LLMError::MissingApiKey);
        }

        let body = ChatRequest {
            model: route_model(options.model_or(&self.model)),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let request = self.client
            .post(self.base_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE);

        send_completion(request, &body).await
    }
}
