//! Domain layer - Core business objects with no external dependencies
//!
//! This layer contains:
//! - Entities: sessions, messages, farm inputs, yield predictions, knowledge records
//! - Traits: Abstractions for infrastructure (SessionStore)

pub mod entities;
pub mod traits;
