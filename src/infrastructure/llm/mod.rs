//! LLM integration - OpenAI-compatible chat completions

pub mod traits;
pub mod config;
pub mod conversation;
pub mod providers;


pub use traits::{CompletionOptions, LLM, LLMMessage, LLMResponse, LLMError, LLMResult, LLMUsage, MessageRole};
pub use config::{LLMConfig, LLMProvider};
pub use conversation::{Conversation, ConversationRegistry};
pub use providers::{OfflineProvider, OpenAIProvider, OpenRouterProvider, OFFLINE_NOTICE};
