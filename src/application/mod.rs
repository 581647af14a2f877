//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: yield prediction, context enrichment, chat orchestration, chart data
//! - Errors: Domain-specific errors

pub mod errors;
pub mod services;
