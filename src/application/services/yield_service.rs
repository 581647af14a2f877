//! Yield prediction
//!
//! Combines the trained forest (when an artifact is available) with the
//! knowledge base to produce an estimate, a risk level, the factors behind it
//! and concrete recommendations. Without a model the estimate is the crop's
//! average yield; when the model fails, that average is adjusted for
//! irrigation, rainfall and fertilizer.

use std::sync::Arc;
use tracing::{debug, warn};

use super::location::state_from_location;
use crate::application::errors::ModelError;
use crate::domain::entities::{
    CropInfo, FarmInput, Impact, InfluentialFactor, RiskLevel, YieldPrediction,
};
use crate::infrastructure::knowledge::{title_case, KnowledgeBase};
use crate::infrastructure::model::{Column, CropStatistics, Features, YieldModel};

pub const DATA_SOURCE: &str =
    "Government of India Agricultural Statistics (Ministry of Agriculture & Farmers Welfare, 2023)";

const DEFAULT_RAINFALL_MM: f64 = 900.0;
const DEFAULT_IRRIGATION_PERCENT: f64 = 60.0;
const DEFAULT_FERTILIZER_KG_HA: f64 = 150.0;
const DEFAULT_TEMPERATURE_C: f64 = 27.0;
const DEFAULT_YIELD_KG_HA: f64 = 3000.0;

const HEURISTIC_CONFIDENCE: f64 = 0.75;
const MAX_MODEL_CONFIDENCE: f64 = 0.92;

/// kg/ha to quintal/acre
const QUINTAL_ACRE_PER_KG_HA: f64 = 0.0404686 / 10.0;

const MAX_FACTORS: usize = 5;
const MAX_RECOMMENDATIONS: usize = 5;

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Inputs after defaults have been applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedInputs {
    pub rainfall_mm: f64,
    pub irrigation_percent: f64,
    pub fertilizer_kg_ha: f64,
    pub temperature_c: f64,
}

/// Risk contributions: low irrigation and low rainfall weigh double
pub fn risk_score(inputs: &ResolvedInputs) -> u32 {
    let mut score = 0;
    if inputs.irrigation_percent < 40.0 {
        score += 2;
    }
    if inputs.rainfall_mm < 500.0 {
        score += 2;
    } else if inputs.rainfall_mm > 1500.0 {
        score += 1;
    }
    if inputs.fertilizer_kg_ha < 80.0 {
        score += 1;
    }
    score
}

/// The crop's average yield, or the flat default for unknown crops
pub fn baseline_yield(crop: Option<&CropInfo>) -> f64 {
    crop.map(|c| c.yield_range_kg_ha.avg).unwrap_or(DEFAULT_YIELD_KG_HA)
}

/// Knowledge-based estimate used when the model fails to produce a value
pub fn heuristic_yield(crop: Option<&CropInfo>, inputs: &ResolvedInputs) -> f64 {
    let Some(crop) = crop else {
        return DEFAULT_YIELD_KG_HA;
    };
    let range = crop.yield_range_kg_ha;

    let irrigation_factor = 1.0 + (inputs.irrigation_percent - 50.0) / 100.0 * 0.3;
    let rainfall_factor = if optimal_rainfall(inputs.rainfall_mm) { 1.0 } else { 0.85 };
    let fertilizer_factor = 1.0 + (inputs.fertilizer_kg_ha - 100.0) / 200.0 * 0.2;

    let estimate = range.avg * irrigation_factor * rainfall_factor * fertilizer_factor;
    estimate.min(range.max).max(range.min)
}

fn optimal_rainfall(rainfall_mm: f64) -> bool {
    rainfall_mm > 600.0 && rainfall_mm < 1200.0
}

/// A zero or missing value means "not provided"
fn provided(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

pub struct YieldPredictor {
    knowledge: Arc<KnowledgeBase>,
    model: Option<Arc<YieldModel>>,
    stats: Option<Arc<CropStatistics>>,
}

impl YieldPredictor {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        model: Option<YieldModel>,
        stats: Option<CropStatistics>,
    ) -> Self {
        Self {
            knowledge,
            model: model.map(Arc::new),
            stats: stats.map(Arc::new),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn model(&self) -> Option<&YieldModel> {
        self.model.as_deref()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Apply the state's average rainfall and the fixed defaults
    pub fn resolve_inputs(&self, input: &FarmInput, state: &str) -> ResolvedInputs {
        let default_rainfall = self
            .knowledge
            .state(state)
            .map(|s| s.rainfall_mm.avg)
            .unwrap_or(DEFAULT_RAINFALL_MM);

        ResolvedInputs {
            rainfall_mm: provided(input.rainfall_mm).unwrap_or(default_rainfall),
            irrigation_percent: provided(input.irrigation_percent)
                .unwrap_or(DEFAULT_IRRIGATION_PERCENT),
            fertilizer_kg_ha: provided(input.fertilizer_kg_ha).unwrap_or(DEFAULT_FERTILIZER_KG_HA),
            temperature_c: provided(input.temperature_c).unwrap_or(DEFAULT_TEMPERATURE_C),
        }
    }

    pub fn predict(&self, input: &FarmInput) -> YieldPrediction {
        let crop_info = self.knowledge.crop(&input.crop_type);
        let state = state_from_location(&input.location, &self.knowledge);
        let inputs = self.resolve_inputs(input, &state);

        let (predicted, confidence) = match self.model_estimate(input, &state, &inputs) {
            Some(Ok(estimate)) => estimate,
            Some(Err(e)) => {
                warn!("Model prediction failed: {}. Using knowledge-based estimate.", e);
                (heuristic_yield(crop_info, &inputs), HEURISTIC_CONFIDENCE)
            }
            None => (baseline_yield(crop_info), HEURISTIC_CONFIDENCE),
        };

        debug!(
            "Predicted {:.1} kg/ha for {} in {} (confidence {:.2})",
            predicted, input.crop_type, state, confidence
        );

        let risk_level = RiskLevel::from_score(risk_score(&inputs));

        let (state_avg, national_avg) = match &self.stats {
            Some(stats) => (
                stats.state_average(&input.crop_type, &state),
                stats.national_average(&input.crop_type),
            ),
            None => (None, None),
        };

        let mut factors = influential_factors(input, crop_info, &inputs);
        factors.truncate(MAX_FACTORS);

        let mut recommendations = recommendations(crop_info, &inputs, risk_level);
        recommendations.truncate(MAX_RECOMMENDATIONS);

        YieldPrediction {
            predicted_yield_kg_ha: round2(predicted),
            predicted_yield_quintal_acre: round2(predicted * QUINTAL_ACRE_PER_KG_HA),
            confidence_score: round2(confidence),
            risk_level,
            state_avg_yield: state_avg.map(round2),
            national_avg_yield: national_avg.map(round2),
            influential_factors: factors,
            recommendations,
            crop_info: crop_info.cloned(),
            comparison: comparison(predicted, national_avg),
            data_source: DATA_SOURCE.to_string(),
        }
    }

    /// `None` without a model; unresolved categories encode as 0
    fn model_estimate(
        &self,
        input: &FarmInput,
        state: &str,
        inputs: &ResolvedInputs,
    ) -> Option<Result<(f64, f64), ModelError>> {
        let model = self.model.as_deref()?;

        // State and district are encoded from the farm's location rather than
        // always 0, so models trained with those columns can use them
        let features = Features {
            state: model.encode(Column::State, state).unwrap_or(0),
            district: model.encode(Column::District, &input.location).unwrap_or(0),
            crop: model.encode(Column::Crop, &input.crop_type).unwrap_or(0),
            season: model.encode(Column::Season, &input.season).unwrap_or(0),
            soil: model.encode(Column::SoilType, &input.soil_type).unwrap_or(0),
            rainfall_mm: inputs.rainfall_mm,
            irrigation_percent: inputs.irrigation_percent,
            fertilizer_kg_ha: inputs.fertilizer_kg_ha,
            temperature_c: inputs.temperature_c,
        };

        Some(model.predict(&features).and_then(|value| {
            if value.is_finite() {
                Ok((value, model.stats.test_score.min(MAX_MODEL_CONFIDENCE)))
            } else {
                Err(ModelError::Invalid("non-finite prediction".to_string()))
            }
        }))
    }
}

fn influential_factors(
    input: &FarmInput,
    crop: Option<&CropInfo>,
    inputs: &ResolvedInputs,
) -> Vec<InfluentialFactor> {
    let mut factors = Vec::new();

    let irrigation = inputs.irrigation_percent;
    factors.push(if irrigation >= 70.0 {
        InfluentialFactor::new(
            "Irrigation",
            Impact::Positive,
            format!("{}% coverage - excellent water availability", irrigation),
        )
    } else if irrigation >= 40.0 {
        InfluentialFactor::new(
            "Irrigation",
            Impact::Moderate,
            format!("{}% coverage - adequate but can improve", irrigation),
        )
    } else {
        InfluentialFactor::new(
            "Irrigation",
            Impact::Negative,
            format!("{}% coverage - insufficient, consider bore wells", irrigation),
        )
    });

    let rainfall = inputs.rainfall_mm;
    factors.push(if optimal_rainfall(rainfall) {
        InfluentialFactor::new("Rainfall", Impact::Positive, format!("{}mm - optimal range", rainfall))
    } else {
        let side = if rainfall < 600.0 { "below" } else { "above" };
        InfluentialFactor::new("Rainfall", Impact::Risk, format!("{}mm - {} optimal", rainfall, side))
    });

    if let Some(crop) = crop {
        let soil = title_case(&input.soil_type);
        factors.push(if crop.optimal_soil.iter().any(|s| *s == soil) {
            InfluentialFactor::new(
                "Soil Type",
                Impact::Positive,
                format!("{} is ideal for {}", input.soil_type, input.crop_type),
            )
        } else {
            InfluentialFactor::new(
                "Soil Type",
                Impact::Moderate,
                format!("{} - consider soil amendments", input.soil_type),
            )
        });
    }

    let fertilizer = inputs.fertilizer_kg_ha;
    factors.push(InfluentialFactor::new(
        "Fertilizer",
        if fertilizer >= 120.0 { Impact::Positive } else { Impact::Moderate },
        format!("{} kg/ha applied", fertilizer),
    ));

    factors
}

fn recommendations(crop: Option<&CropInfo>, inputs: &ResolvedInputs, risk: RiskLevel) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(crop) = crop {
        let dose = &crop.fertilizer_recommendation;
        out.push(format!(
            "Recommended fertilizer: N-{}, P-{}, K-{}",
            dose.n, dose.p, dose.k
        ));
        out.extend(crop.tips.iter().take(2).cloned());
    }

    if inputs.irrigation_percent < 50.0 {
        out.push(
            "Consider installing drip irrigation or micro-sprinklers to improve water efficiency"
                .to_string(),
        );
    }

    if risk == RiskLevel::High {
        out.push("⚠️ High risk detected - Consider crop insurance under PMFBY scheme".to_string());
    }

    out.push(
        "Get soil tested under Soil Health Card scheme for precise fertilizer recommendations"
            .to_string(),
    );

    out
}

fn comparison(predicted: f64, national_avg: Option<f64>) -> String {
    let Some(national) = national_avg.filter(|n| *n > 0.0) else {
        return String::new();
    };

    if predicted > national * 1.1 {
        format!(
            "Your predicted yield is {:.0}% above national average ({:.0} kg/ha)",
            (predicted / national - 1.0) * 100.0,
            national
        )
    } else if predicted < national * 0.9 && predicted > 0.0 {
        format!(
            "Your predicted yield is {:.0}% below national average ({:.0} kg/ha)",
            (national / predicted - 1.0) * 100.0,
            national
        )
    } else if predicted < national * 0.9 {
        format!("Your predicted yield is below national average ({:.0} kg/ha)", national)
    } else {
        format!("Your predicted yield is near national average ({:.0} kg/ha)", national)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::model::stats::tests::SAMPLE_CSV;
    use crate::infrastructure::model::tests::sample_model_json;

    fn predictor(with_model: bool, with_stats: bool) -> YieldPredictor {
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        let model = with_model.then(|| YieldModel::from_json(&sample_model_json()).unwrap());
        let stats = with_stats.then(|| CropStatistics::from_csv(SAMPLE_CSV).unwrap());
        YieldPredictor::new(kb, model, stats)
    }

    fn wheat_in_punjab() -> FarmInput {
        FarmInput::new("wheat", "loamy", "rabi", "Punjab")
    }

    fn model_with_trees(trees: serde_json::Value) -> YieldModel {
        let mut artifact: serde_json::Value = serde_json::from_str(&sample_model_json()).unwrap();
        artifact["trees"] = trees;
        YieldModel::from_json(&artifact.to_string()).unwrap()
    }

    #[test]
    fn test_without_model_uses_crop_average() {
        let prediction = predictor(false, false).predict(&wheat_in_punjab());

        // wheat average, no adjustment for Punjab's 500mm rainfall
        assert_eq!(prediction.predicted_yield_kg_ha, 3500.0);
        assert_eq!(prediction.predicted_yield_quintal_acre, 14.16);
        assert_eq!(prediction.confidence_score, 0.75);
        assert_eq!(prediction.risk_level, RiskLevel::Low);
        assert_eq!(prediction.comparison, "");
        assert!(prediction.crop_info.is_some());
        assert_eq!(prediction.data_source, DATA_SOURCE);
    }

    #[test]
    fn test_factors_follow_inputs() {
        let prediction = predictor(false, false).predict(&wheat_in_punjab());
        let factors: Vec<(&str, Impact)> = prediction
            .influential_factors
            .iter()
            .map(|f| (f.factor.as_str(), f.impact))
            .collect();

        assert_eq!(
            factors,
            vec![
                ("Irrigation", Impact::Moderate),
                ("Rainfall", Impact::Risk),
                ("Soil Type", Impact::Positive),
                ("Fertilizer", Impact::Positive),
            ]
        );
        assert_eq!(prediction.influential_factors[1].detail, "500mm - below optimal");
    }

    #[test]
    fn test_unknown_crop_uses_flat_default() {
        let mut input = FarmInput::new("dragonfruit", "red", "kharif", "Atlantis");
        input.rainfall_mm = Some(800.0);
        let prediction = predictor(false, false).predict(&input);

        assert_eq!(prediction.predicted_yield_kg_ha, 3000.0);
        assert!(prediction.crop_info.is_none());
        // no soil factor without crop knowledge
        assert_eq!(prediction.influential_factors.len(), 3);
        assert_eq!(
            prediction.recommendations,
            vec!["Get soil tested under Soil Health Card scheme for precise fertilizer recommendations"]
        );
    }

    #[test]
    fn test_failed_model_falls_back_to_adjusted_estimate() {
        let broken = model_with_trees(serde_json::json!([
            {"nodes": [
                {"type": "split", "feature": 6, "threshold": 50.0, "left": 1, "right": 7},
                {"type": "leaf", "value": 1000.0}
            ]}
        ]));
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        let predictor = YieldPredictor::new(kb, Some(broken), None);

        // irrigation defaults to 60, above the threshold, so the walk hits node 7
        let prediction = predictor.predict(&wheat_in_punjab());

        // 3500 * 1.03 * 0.85 * 1.05 with Punjab's average rainfall of 500mm
        assert_eq!(prediction.predicted_yield_kg_ha, 3217.46);
        assert_eq!(prediction.confidence_score, 0.75);
    }

    #[test]
    fn test_unknown_labels_encode_as_zero() {
        // Crop codes: Rice = 0, Wheat = 1
        let by_crop = model_with_trees(serde_json::json!([
            {"nodes": [
                {"type": "split", "feature": 2, "threshold": 0.5, "left": 1, "right": 2},
                {"type": "leaf", "value": 2500.0},
                {"type": "leaf", "value": 4100.0}
            ]}
        ]));
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        let predictor = YieldPredictor::new(kb, Some(by_crop), None);

        let wheat = predictor.predict(&wheat_in_punjab());
        assert_eq!(wheat.predicted_yield_kg_ha, 4100.0);

        let millet = predictor.predict(&FarmInput::new("bajra", "sandy", "kharif", "Jodhpur"));
        assert_eq!(millet.predicted_yield_kg_ha, 2500.0);
        assert_eq!(millet.confidence_score, 0.92);
    }

    #[test]
    fn test_baseline_yield() {
        let kb = KnowledgeBase::builtin().unwrap();
        assert_eq!(baseline_yield(kb.crop("tomato")), kb.crop("tomato").unwrap().yield_range_kg_ha.avg);
        assert_eq!(baseline_yield(None), 3000.0);
    }

    #[test]
    fn test_high_risk_caps_recommendations() {
        let mut input = wheat_in_punjab();
        input.irrigation_percent = Some(10.0);
        input.rainfall_mm = Some(400.0);
        input.fertilizer_kg_ha = Some(20.0);

        let prediction = predictor(false, false).predict(&input);
        assert_eq!(prediction.risk_level, RiskLevel::High);
        assert_eq!(prediction.recommendations.len(), 5);
        assert!(prediction.recommendations[0].starts_with("Recommended fertilizer: N-120 kg/ha"));
        assert!(prediction.recommendations[4].contains("PMFBY"));
        assert_eq!(prediction.predicted_yield_kg_ha, 3500.0);
    }

    #[test]
    fn test_heuristic_stays_in_crop_range() {
        let kb = KnowledgeBase::builtin().unwrap();
        let poor = ResolvedInputs {
            rainfall_mm: 400.0,
            irrigation_percent: 10.0,
            fertilizer_kg_ha: 20.0,
            temperature_c: 27.0,
        };
        // 3500 * 0.88 * 0.85 * 0.92 is below wheat's minimum
        assert_eq!(heuristic_yield(kb.crop("wheat"), &poor), 2500.0);
        assert_eq!(heuristic_yield(None, &poor), 3000.0);
    }

    #[test]
    fn test_zero_inputs_take_defaults() {
        let mut input = wheat_in_punjab();
        input.irrigation_percent = Some(0.0);
        input.fertilizer_kg_ha = Some(0.0);
        let predictor = predictor(false, false);
        let state = state_from_location(&input.location, predictor.knowledge());
        let resolved = predictor.resolve_inputs(&input, &state);

        assert_eq!(resolved.irrigation_percent, 60.0);
        assert_eq!(resolved.fertilizer_kg_ha, 150.0);
        assert_eq!(resolved.rainfall_mm, 500.0);
        assert_eq!(resolved.temperature_c, 27.0);
    }

    #[test]
    fn test_model_prediction_and_averages() {
        let mut input = wheat_in_punjab();
        input.irrigation_percent = Some(80.0);

        let predictor = predictor(true, true);
        assert!(predictor.is_model_loaded());
        let prediction = predictor.predict(&input);

        assert_eq!(prediction.predicted_yield_kg_ha, 4200.0);
        assert_eq!(prediction.confidence_score, 0.92);
        assert_eq!(prediction.state_avg_yield, Some(4900.0));
        assert_eq!(prediction.national_avg_yield, Some(4433.33));
        assert_eq!(
            prediction.comparison,
            "Your predicted yield is near national average (4433 kg/ha)"
        );
    }

    #[test]
    fn test_comparison_text() {
        assert_eq!(
            comparison(5000.0, Some(4000.0)),
            "Your predicted yield is 25% above national average (4000 kg/ha)"
        );
        assert_eq!(
            comparison(2000.0, Some(4000.0)),
            "Your predicted yield is 100% below national average (4000 kg/ha)"
        );
        assert_eq!(comparison(2000.0, None), "");
    }

    #[test]
    fn test_risk_score_bands() {
        let base = ResolvedInputs {
            rainfall_mm: 900.0,
            irrigation_percent: 60.0,
            fertilizer_kg_ha: 150.0,
            temperature_c: 27.0,
        };
        assert_eq!(risk_score(&base), 0);
        assert_eq!(risk_score(&ResolvedInputs { rainfall_mm: 1600.0, ..base }), 1);
        assert_eq!(
            risk_score(&ResolvedInputs { irrigation_percent: 20.0, fertilizer_kg_ha: 60.0, ..base }),
            3
        );
    }
}
