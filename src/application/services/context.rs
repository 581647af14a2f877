//! Prompt enrichment
//!
//! Prefixes the farmer's question with what the service already knows about
//! the farm, so the assistant answers with concrete numbers.

use serde_json::Value;

use super::location::state_from_location;
use super::yield_service::YieldPredictor;
use crate::domain::entities::{FarmContext, FarmInput, Language, Range};

const CONTEXT_HEADER: &str = "[CONTEXT FOR ASSISTANT - Use this to provide accurate advice]";

fn format_range(range: &Range, unit: &str) -> String {
    format!("{}-{} {} (avg {})", range.min, range.max, unit, range.avg)
}

fn context_str<'a>(context: &'a FarmContext, key: &str) -> Option<&'a str> {
    context
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Collect the context lines for a farm; empty when nothing is known
pub fn context_parts(context: &FarmContext, predictor: &YieldPredictor) -> Vec<String> {
    let knowledge = predictor.knowledge();
    let mut parts = vec![format!("Farm Details: {}", Value::Object(context.clone()))];

    if let Some(crop_type) = context_str(context, "crop_type") {
        if let Some(crop) = knowledge.crop(crop_type) {
            parts.push(format!(
                "Crop Knowledge ({}): Optimal soil: {}, Yield range: {}, Major pests: {}, Key tips: {}",
                crop_type,
                crop.optimal_soil.join(", "),
                format_range(&crop.yield_range_kg_ha, "kg/ha"),
                crop.major_pests.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
                crop.tips.iter().take(2).cloned().collect::<Vec<_>>().join("; "),
            ));
        }
    }

    if let Some(location) = context_str(context, "location") {
        let state = state_from_location(location, knowledge);
        if let Some(info) = knowledge.state(&state) {
            parts.push(format!(
                "Region Info ({}): Major crops: {}, Typical rainfall: {}, Agri helpline: {}",
                state,
                info.major_crops.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
                format_range(&info.rainfall_mm, "mm"),
                info.agri_helpline,
            ));
        }
    }

    if let Some(input) = FarmInput::from_context(context) {
        let prediction = predictor.predict(&input);
        let factors = prediction
            .influential_factors
            .iter()
            .take(3)
            .map(|f| format!("{}:{}", f.factor, f.impact.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!(
            "ML Yield Prediction: {} kg/ha ({} quintal/acre), Confidence: {:.0}%, Risk: {}, Factors: {}",
            prediction.predicted_yield_kg_ha,
            prediction.predicted_yield_quintal_acre,
            prediction.confidence_score * 100.0,
            prediction.risk_level.as_str(),
            factors,
        ));
    }

    parts
}

/// The message actually sent to the assistant
pub fn build_context_message(
    message: &str,
    farm_context: Option<&FarmContext>,
    language: Language,
    predictor: &YieldPredictor,
) -> String {
    let parts = match farm_context {
        Some(context) if !context.is_empty() => context_parts(context, predictor),
        _ => Vec::new(),
    };

    if parts.is_empty() {
        format!("[FARMER'S QUESTION in {}]: {}", language.code(), message)
    } else {
        format!(
            "{}\n{}\n\n[FARMER'S QUESTION in {}]: {}",
            CONTEXT_HEADER,
            parts.join("\n"),
            language.code(),
            message
        )
    }
}
