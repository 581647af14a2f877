//! OpenAI Provider - chat completions

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::infrastructure::llm::{CompletionOptions, LLMMessage, LLMResponse, LLMError, LLMResult, LLM, LLMUsage};

/// OpenAI provider
pub struct OpenAIProvider {
    api_key: String,
    client: Client,
    base: String,
    model: String,
}

impl OpenAIProvider {
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

pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// API request structure
#[derive(Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// API response structure
#[derive(Deserialize, Debug)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

/// Choice in response
#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

/// Response message
#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

/// Usage information
#[derive(Deserialize, Debug)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Send an OpenAI-compatible completion request and decode the first choice
pub(crate) async fn send_completion(request: RequestBuilder, body: &ChatRequest) -> LLMResult<LLMResponse> {
    debug!("Sending {} messages to {}", body.messages.len(), body.model);

    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| LLMError::NetworkError(e.to_string()))?;

    let status = response.status();
    if status.as_u16() == 429 {
        return Err(LLMError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Chat completion failed with status {}", status);
        return Err(LLMError::ApiError { status: status.as_u16(), body });
    }

    let chat_response: ChatResponse = response
        .json()
        .await
        .map_err(|e| LLMError::ParseError(e.to_string()))?;

    let choice = chat_response.choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

    let content = choice.message.content
        .ok_or_else(|| LLMError::ParseError("Empty message content".to_string()))?;

    let usage = chat_response.usage.map(|u| LLMUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(LLMResponse {
        content,
        model: chat_response.model.unwrap_or_else(|| body.model.clone()),
        usage,
        finish_reason: choice.finish_reason,
    })
}

#[async_trait]
impl LLM for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, messages: Vec<LLMMessage>, options: &CompletionOptions) -> LLMResult<LLMResponse> {
        if self.api_key.is_empty() {
            return Err(LLMError::MissingApiKey);
        }

        let body = ChatRequest {
            model: options.model_or(&self.model).to_string(),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let request = self.client
            .post(self.base_url())
            .header("Authorization", format!("Bearer {}", self.api_key));

        send_completion(request, &body).await
    }
}
