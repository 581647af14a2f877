//! Domain entities - Core business objects with no external dependencies

pub mod farm;
pub mod knowledge;
pub mod language;
pub mod session;

pub use farm::{FarmInput, Impact, InfluentialFactor, RiskLevel, YieldPrediction};
pub use knowledge::{CropInfo, FertilizerDose, Range, Scheme, SeedRate, StateInfo};
pub use language::{detect_language, Language};
pub use session::{ChatMessage, FarmContext, Role, Session};
