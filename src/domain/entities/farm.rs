use serde::{Deserialize, Serialize};

use super::{CropInfo, FarmContext};
use crate::application::errors::AppError;

/// Inputs for a yield estimate
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct FarmInput {
    pub crop_type: String,
    pub soil_type: String,
    pub season: String,
    /// State or district name
    pub location: String,
    #[serde(default)]
    pub rainfall_mm: Option<f64>,
    #[serde(default)]
    pub irrigation_percent: Option<f64>,
    #[serde(default)]
    pub fertilizer_kg_ha: Option<f64>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub area_hectares: Option<f64>,
}

impl FarmInput {
    pub fn new(
        crop_type: impl Into<String>,
        soil_type: impl Into<String>,
        season: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            crop_type: crop_type.into(),
            soil_type: soil_type.into(),
            season: season.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    /// Build from a chat farm context.
    ///
    /// Returns `None` unless crop, soil, season and location are all present
    /// as strings.
    pub fn from_context(context: &FarmContext) -> Option<Self> {
        let text = |key: &str| context.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let number = |key: &str| context.get(key).and_then(|v| v.as_f64());

        Some(Self {
            crop_type: text("crop_type")?,
            soil_type: text("soil_type")?,
            season: text("season")?,
            location: text("location")?,
            rainfall_mm: number("rainfall_mm"),
            irrigation_percent: number("irrigation_percent"),
            fertilizer_kg_ha: number("fertilizer_kg_ha"),
            temperature_c: number("temperature_c"),
            area_hectares: number("area_hectares"),
        })
    }

    /// Reject measurements no farm can have. Zero stays valid and means
    /// "use the default".
    pub fn validate(&self) -> Result<(), AppError> {
        let measurements = [
            ("rainfall_mm", self.rainfall_mm),
            ("irrigation_percent", self.irrigation_percent),
            ("fertilizer_kg_ha", self.fertilizer_kg_ha),
            ("area_hectares", self.area_hectares),
        ];
        for (name, value) in measurements {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(AppError::InvalidInput(format!("{} must be a non-negative number", name)));
                }
            }
        }

        if self.irrigation_percent.is_some_and(|value| value > 100.0) {
            return Err(AppError::InvalidInput("irrigation_percent cannot exceed 100".to_string()));
        }
        if self.temperature_c.is_some_and(|value| !value.is_finite()) {
            return Err(AppError::InvalidInput("temperature_c must be a number".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 3 => RiskLevel::High,
            s if s >= 1 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// How a factor pushes the yield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Impact {
    Positive,
    Moderate,
    Negative,
    Risk,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Positive => "Positive",
            Impact::Moderate => "Moderate",
            Impact::Negative => "Negative",
            Impact::Risk => "Risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InfluentialFactor {
    pub factor: String,
    pub impact: Impact,
    pub detail: String,
}

impl InfluentialFactor {
    pub fn new(factor: impl Into<String>, impact: Impact, detail: impl Into<String>) -> Self {
        Self {
            factor: factor.into(),
            impact,
            detail: detail.into(),
        }
    }
}

/// Yield estimate with the reasoning a farmer can act on
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct YieldPrediction {
    pub predicted_yield_kg_ha: f64,
    pub predicted_yield_quintal_acre: f64,
    pub confidence_score: f64,
    pub risk_level: RiskLevel,
    pub state_avg_yield: Option<f64>,
    pub national_avg_yield: Option<f64>,
    pub influential_factors: Vec<InfluentialFactor>,
    pub recommendations: Vec<String>,
    pub crop_info: Option<CropInfo>,
    pub comparison: String,
    pub data_source: String,
}
