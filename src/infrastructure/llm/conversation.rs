//! Per-session conversations

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::{CompletionOptions, LLMConfig, LLMError, LLMMessage, LLM};

/// Text returned to the farmer when the provider call fails
pub fn apology(error: &LLMError) -> String {
    match error {
        LLMError::ApiError { .. } | LLMError::RateLimited => format!(
            "I encountered an error connecting to the AI service. Details: {}",
            error
        ),
        _ => format!(
            "Sorry, I am having trouble connecting to the server. Error: {}",
            error
        ),
    }
}

/// Chat history with one farmer, seeded with the system prompt
pub struct Conversation {
    session_id: String,
    history: Vec<LLMMessage>,
    provider: Arc<dyn LLM>,
    options: CompletionOptions,
}

impl Conversation {
    pub fn new(session_id: impl Into<String>, provider: Arc<dyn LLM>, config: &LLMConfig) -> Self {
        Self {
            session_id: session_id.into(),
            history: vec![LLMMessage::system(config.system_prompt())],
            provider,
            options: CompletionOptions {
                model: Some(config.model.clone()),
                temperature: Some(config.temperature),
                max_tokens: config.max_tokens,
            },
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn history(&self) -> &[LLMMessage] {
        &self.history
    }

    /// Send one user turn. Failures come back as an apology and leave the
    /// assistant side of the history untouched.
    pub async fn send(&mut self, text: impl Into<String>) -> String {
        self.history.push(LLMMessage::user(text));

        let result = self
            .provider
            .chat(self.history.clone(), &self.options)
            .await;

        match result {
            Ok(response) => {
                debug!(
                    "Session {} got {} chars from {}",
                    self.session_id,
                    response.content.len(),
                    self.provider.name()
                );
                self.history.push(LLMMessage::assistant(response.content.clone()));
                response.content
            }
            Err(e) => {
                warn!("LLM call for session {} failed: {}", self.session_id, e);
                apology(&e)
            }
        }
    }
}

/// Conversations keyed by session id, each behind its own lock
pub struct ConversationRegistry {
    config: LLMConfig,
    provider: Arc<dyn LLM>,
    conversations: RwLock<HashMap<String, Arc<Mutex<Conversation>>>>,
}

impl ConversationRegistry {
    pub fn new(config: LLMConfig, provider: Arc<dyn LLM>) -> Self {
        Self {
            config,
            provider,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Provider chosen from the config's key
    pub fn from_config(config: LLMConfig) -> Self {
        let provider = config.build_provider();
        Self::new(config, provider)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn conversation(&self, session_id: &str) -> Arc<Mutex<Conversation>> {
        if let Some(existing) = self.conversations.read().await.get(session_id) {
            return existing.clone();
        }

        let mut conversations = self.conversations.write().await;
        conversations
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(Conversation::new(
                    session_id,
                    self.provider.clone(),
                    &self.config,
                )))
            })
            .clone()
    }

    /// Send through the session's conversation; other sessions are not blocked
    pub async fn send(&self, session_id: &str, text: impl Into<String>) -> String {
        let conversation = self.conversation(session_id).await;
        let mut conversation = conversation.lock().await;
        conversation.send(text).await
    }
}
