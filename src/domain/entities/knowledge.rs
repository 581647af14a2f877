//! Static agronomy reference records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{min, max, avg}` triple used for yields and rainfall
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Seed rate is a plain number for most crops, a description for setts/tubers
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SeedRate {
    KgPerHa(f64),
    Description(String),
}

/// Recommended nutrient doses
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FertilizerDose {
    #[serde(rename = "N")]
    pub n: String,
    #[serde(rename = "P")]
    pub p: String,
    #[serde(rename = "K")]
    pub k: String,
    /// Extra amendments such as gypsum
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CropInfo {
    pub name_hi: String,
    pub name_te: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub optimal_season: Vec<String>,
    /// Season name to month description, e.g. `Kharif: June-July`
    pub sowing_months: BTreeMap<String, String>,
    pub harvest_months: BTreeMap<String, String>,
    pub water_requirement_mm: f64,
    pub optimal_soil: Vec<String>,
    pub optimal_ph: String,
    pub seed_rate_kg_ha: SeedRate,
    pub spacing_cm: String,
    pub fertilizer_recommendation: FertilizerDose,
    pub major_pests: Vec<String>,
    pub major_diseases: Vec<String>,
    pub irrigation_stages: Vec<String>,
    pub top_states: Vec<String>,
    pub yield_range_kg_ha: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msp_2024: Option<u32>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits_analysis: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StateInfo {
    pub name_hi: String,
    pub name_te: String,
    pub major_crops: Vec<String>,
    pub soil_types: Vec<String>,
    pub rainfall_mm: Range,
    pub kharif_crops: Vec<String>,
    pub rabi_crops: Vec<String>,
    pub agri_helpline: String,
    pub major_issues: Vec<String>,
    pub govt_schemes: Vec<String>,
}

/// A central government farmer scheme
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Scheme {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub benefit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}
