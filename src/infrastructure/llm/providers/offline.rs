//! Offline Provider - answers when no API key is configured

use async_trait::async_trait;

use crate::infrastructure::llm::{CompletionOptions, LLMMessage, LLMResponse, LLMResult, LLM};

pub const OFFLINE_NOTICE: &str =
    "I am a mock AI assistant. Please provide a valid API Key in .env to get real responses.";

#[derive(Debug, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LLM for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn chat(&self, _messages: Vec<LLMMessage>, options: &CompletionOptions) -> LLMResult<LLMResponse> {
        Ok(LLMResponse {
            content: OFFLINE_NOTICE.to_string(),
            model: options.model_or("offline").to_string(),
            usage: None,
            finish_reason: Some("stop".to_string()),
        })
    }
}
