//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Knowledge: Agronomy knowledge base
//! - Model: Exported yield forest and historical crop statistics
//! - Storage/Database: Session and message persistence
//! - LLM: Chat completion providers
//! - Weather: Open-Meteo forecasts and field advisories
//! - HTTP: REST API

pub mod config;
pub mod database;
pub mod http;
pub mod knowledge;
pub mod llm;
pub mod model;
pub mod storage;
pub mod weather;
