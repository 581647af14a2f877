//! In-memory session storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::{ChatMessage, Session};
use crate::domain::traits::SessionStore;

/// Process-local store, used for tests and `--memory` runs
#[derive(Default, Clone)]
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    messages: Arc<RwLock<HashMap<String, Vec<ChatMessage>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: &Session) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn append_messages(&self, messages: &[ChatMessage]) -> Result<(), StorageError> {
        let mut stored = self.messages.write().await;
        for message in messages {
            stored
                .entry(message.session_id.clone())
                .or_insert_with(Vec::new)
                .push(message.clone());
        }
        Ok(())
    }

    async fn list_messages(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StorageError> {
        let stored = self.messages.read().await;
        let mut messages = stored.get(session_id).cloned().unwrap_or_default();
        // stable sort keeps insertion order for equal timestamps
        messages.sort_by_key(|m| m.timestamp);
        messages.truncate(limit);
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Language, Role};

    #[tokio::test]
    async fn test_session_roundtrip() {
        let store = MemoryStore::new();
        let session = Session::new(Language::Te);
        store.create_session(&session).await.unwrap();

        assert_eq!(store.get_session(&session.id).await.unwrap(), Some(session));
        assert_eq!(store.get_session("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_messages_are_ordered_and_limited() {
        let store = MemoryStore::new();
        let batch: Vec<ChatMessage> = (0..5)
            .map(|i| ChatMessage::user("s1", format!("question {}", i), Language::En))
            .collect();
        store.append_messages(&batch).await.unwrap();
        store
            .append_messages(&[ChatMessage::assistant("s2", "other session", Language::Hi)])
            .await
            .unwrap();

        let listed = store.list_messages("s1", 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].content, "question 0");
        assert!(listed.iter().all(|m| m.role == Role::User));
        assert!(store.list_messages("s3", 100).await.unwrap().is_empty());
    }
}
