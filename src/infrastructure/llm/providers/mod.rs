//! LLM Providers

pub mod offline;
pub mod openai;
pub mod openrouter;

pub use offline::{OfflineProvider, OFFLINE_NOTICE};
pub use openai::OpenAIProvider;
pub use openrouter::OpenRouterProvider;
