//! Application services - Business logic orchestration

pub mod chart_service;
pub mod chat_service;
pub mod context;
pub mod location;
pub mod yield_service;

pub use chart_service::ChartService;
pub use chat_service::{ChatRequest, ChatResponse, ChatService};
pub use context::build_context_message;
pub use location::state_from_location;
pub use yield_service::YieldPredictor;
