use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Language;

/// Free-form farm details a client attaches to a session or a chat turn
pub type FarmContext = serde_json::Map<String, serde_json::Value>;

/// A conversation with one farmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub language: Language,
    pub farm_context: Option<FarmContext>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(language: Language) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            language,
            farm_context: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_farm_context(mut self, context: FarmContext) -> Self {
        self.farm_context = Some(context);
        self
    }
}

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// One entry of a session's append-only message log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(session_id: impl Into<String>, role: Role, content: impl Into<String>, language: Language) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            role,
            content: content.into(),
            language,
            timestamp: Utc::now(),
        }
    }

    pub fn user(session_id: impl Into<String>, content: impl Into<String>, language: Language) -> Self {
        Self::new(session_id, Role::User, content, language)
    }

    pub fn assistant(session_id: impl Into<String>, content: impl Into<String>, language: Language) -> Self {
        Self::new(session_id, Role::Assistant, content, language)
    }
}
