use async_trait::async_trait;
use crate::domain::entities::{ChatMessage, Session};
use crate::application::errors::StorageError;

/// Store trait - abstraction for session and message persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    // Session operations
    async fn create_session(&self, session: &Session) -> Result<(), StorageError>;
    async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError>;

    // Message operations
    async fn append_messages(&self, messages: &[ChatMessage]) -> Result<(), StorageError>;

    /// Oldest first, at most `limit` messages
    async fn list_messages(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StorageError>;
}
