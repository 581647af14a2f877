//! SQLite-backed session storage

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::{ChatMessage, FarmContext, Language, Role, Session};
use crate::domain::traits::SessionStore;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> SqliteResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> SqliteResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqliteResult<Self> {
        init_tables(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T, StorageError>) -> Result<T, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        f(&conn)
    }
}

fn init_tables(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            language TEXT NOT NULL DEFAULT 'en',
            farm_context TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT 'en',
            timestamp TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, timestamp)",
        [],
    )?;

    Ok(())
}

/// Fixed-width so that text ordering matches time ordering
fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("bad timestamp '{}': {}", value, e)))
}

fn parse_language(code: &str) -> Language {
    Language::from_code(code).unwrap_or_default()
}

#[async_trait]
impl SessionStore for Database {
    async fn create_session(&self, session: &Session) -> Result<(), StorageError> {
        let farm_context = session
            .farm_context
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO sessions (id, language, farm_context, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session.id,
                    session.language.code(),
                    farm_context,
                    format_timestamp(&session.created_at),
                    format_timestamp(&session.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError> {
        let row = self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, language, farm_context, created_at, updated_at FROM sessions WHERE id = ?1",
                    [id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Option<String>>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        })?;

        let Some((id, language, farm_context, created_at, updated_at)) = row else {
            return Ok(None);
        };

        let farm_context = farm_context
            .map(|raw| serde_json::from_str::<FarmContext>(&raw))
            .transpose()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(Some(Session {
            id,
            language: parse_language(&language),
            farm_context,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        }))
    }

    async fn append_messages(&self, messages: &[ChatMessage]) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            for message in messages {
                tx.execute(
                    "INSERT INTO messages (id, session_id, role, content, language, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        message.id,
                        message.session_id,
                        message.role.as_str(),
                        message.content,
                        message.language.code(),
                        format_timestamp(&message.timestamp),
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    async fn list_messages(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>, StorageError> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, role, content, language, timestamp FROM messages
                 WHERE session_id = ?1 ORDER BY timestamp ASC, rowid ASC LIMIT ?2",
            )?;

            let rows = stmt.query_map(params![session_id, limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })?;

        let mut messages = Vec::with_capacity(rows.len());
        for (id, session_id, role, content, language, timestamp) in rows {
            let role = Role::parse(&role)
                .ok_or_else(|| StorageError::Serialization(format!("unknown role '{}'", role)))?;
            messages.push(ChatMessage {
                id,
                session_id,
                role,
                content,
                language: parse_language(&language),
                timestamp: parse_timestamp(&timestamp)?,
            });
        }
        Ok(messages)
    }
}
