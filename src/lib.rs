//! AgroBot - multilingual farming assistant backend
//!
//! Knowledge-enriched chat, crop yield estimates, weather advisories and
//! chart payloads for farmers in English, Hindi and Telugu.

pub mod application;
pub mod domain;
pub mod infrastructure;
