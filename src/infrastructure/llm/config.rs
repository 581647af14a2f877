//! LLM Configuration

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::providers::{OfflineProvider, OpenAIProvider, OpenRouterProvider};
use super::LLM;

/// Prompt shipped with the binary
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../../../data/system_prompt.txt");

/// Keys that mean "not configured"
const PLACEHOLDER_KEYS: &[&str] = &["your_key_here"];

/// OpenRouter keys carry this prefix
const OPENROUTER_KEY_PREFIX: &str = "sk-or-v1";

/// Which backend a key routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    OpenRouter,
    Offline,
}

/// LLM Configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub openai_base: String,
    pub openrouter_base: String,
    pub timeout_seconds: u64,
    /// Overrides the built-in prompt
    pub system_prompt: Option<String>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: Some(1000),
            openai_base: "https://api.openai.com/v1".to_string(),
            openrouter_base: "https://openrouter.ai/api/v1".to_string(),
            timeout_seconds: 60,
            system_prompt: None,
        }
    }
}

impl LLMConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("LLM_API_KEY").or_else(|_| std::env::var("EMERGENT_LLM_KEY")) {
            self.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.model = model;
        }

        if let Ok(prompt) = std::env::var("LLM_SYSTEM_PROMPT") {
            self.system_prompt = Some(prompt);
        }

        if let Ok(temp) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(t) = temp.parse() {
                self.temperature = t;
            }
        }
    }

    /// Pick the backend from the shape of the key
    pub fn provider(&self) -> LLMProvider {
        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => LLMProvider::Offline,
            Some(key) if PLACEHOLDER_KEYS.contains(&key) => LLMProvider::Offline,
            Some(key) if key.starts_with(OPENROUTER_KEY_PREFIX) => LLMProvider::OpenRouter,
            Some(_) => LLMProvider::OpenAI,
        }
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn build_provider(&self) -> Arc<dyn LLM> {
        let key = self.api_key.as_deref().unwrap_or_default().trim().to_string();
        match self.provider() {
            LLMProvider::Offline => Arc::new(OfflineProvider::new()),
            LLMProvider::OpenRouter => Arc::new(OpenRouterProvider::new(
                key,
                &self.openrouter_base,
                &self.model,
                self.timeout(),
            )),
            LLMProvider::OpenAI => Arc::new(OpenAIProvider::new(
                key,
                &self.openai_base,
                &self.model,
                self.timeout(),
            )),
        }
    }
}
