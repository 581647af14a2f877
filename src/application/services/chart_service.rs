//! Chart payloads for the mobile client
//!
//! Every chart is derived from a fresh yield prediction (or, for the seasonal
//! calendar, straight from crop knowledge). Shapes are what the client's
//! charting library expects.

use serde::Serialize;

use super::yield_service::YieldPredictor;
use crate::application::errors::AppError;
use crate::domain::entities::{FarmInput, Impact, InfluentialFactor, YieldPrediction};
use crate::infrastructure::knowledge::{title_case, KnowledgeBase};

const BAR_COLORS: [&str; 4] = ["#4CAF50", "#2196F3", "#FF9800", "#9C27B0"];
const PIE_COLORS: [&str; 5] = ["#4CAF50", "#2196F3", "#FF9800", "#9C27B0", "#E91E63"];

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

impl ChartSeries {
    fn new(points: Vec<(String, f64)>, palette: &[&str]) -> Self {
        let colors = palette.iter().take(points.len()).map(|c| c.to_string()).collect();
        let (labels, values) = points.into_iter().unzip();
        Self { labels, values, colors }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldComparisonChart {
    pub chart_type: String,
    pub title: String,
    pub data: ChartSeries,
    pub unit: String,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorsChart {
    pub chart_type: String,
    pub title: String,
    pub data: ChartSeries,
    pub insights: Vec<InfluentialFactor>,
}

/// One step on the improvement roadmap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub action: String,
    pub action_hi: String,
    pub action_te: String,
    pub current: f64,
    pub potential: f64,
    pub improvement_percent: f64,
    pub cost_estimate: String,
    pub benefit_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapSummary {
    pub total_potential_improvement: String,
    pub estimated_additional_income: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationsChart {
    pub chart_type: String,
    pub title: String,
    pub current_yield: f64,
    pub max_potential_yield: f64,
    pub improvements: Vec<Improvement>,
    pub summary: RoadmapSummary,
}

/// Month flags (index 0 = January)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Activities {
    pub land_prep: [u8; 12],
    pub sowing: [u8; 12],
    pub growing: [u8; 12],
    pub harvest: [u8; 12],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPeriod {
    pub stage: String,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalChart {
    pub chart_type: String,
    pub title: String,
    pub crop: String,
    pub months: Vec<String>,
    pub activities: Activities,
    pub irrigation_stages: Vec<String>,
    pub critical_periods: Vec<CriticalPeriod>,
}

/// Prediction against state, national and best-case yields
pub fn yield_comparison(input: &FarmInput, prediction: &YieldPrediction) -> YieldComparisonChart {
    let predicted = prediction.predicted_yield_kg_ha;
    let best_case = prediction
        .crop_info
        .as_ref()
        .map(|c| c.yield_range_kg_ha.max)
        .unwrap_or(predicted * 1.2);

    let points = vec![
        ("Your Prediction".to_string(), predicted),
        (
            "State Average".to_string(),
            prediction.state_avg_yield.unwrap_or(predicted * 0.9),
        ),
        (
            "National Average".to_string(),
            prediction.national_avg_yield.unwrap_or(predicted * 0.85),
        ),
        ("Best Case".to_string(), best_case),
    ];

    YieldComparisonChart {
        chart_type: "bar".to_string(),
        title: format!("{} Yield Comparison", title_case(&input.crop_type)),
        data: ChartSeries::new(points, &BAR_COLORS),
        unit: "kg/ha".to_string(),
        analysis: prediction.comparison.clone(),
    }
}

/// Relative weight of each factor, nudged by its impact
pub fn factors(prediction: &YieldPrediction) -> FactorsChart {
    let mut weights: Vec<(String, f64)> = [
        ("Irrigation", 30.0),
        ("Rainfall", 25.0),
        ("Soil Type", 20.0),
        ("Fertilizer", 15.0),
        ("Season", 10.0),
    ]
    .iter()
    .map(|(name, w)| (name.to_string(), *w))
    .collect();

    for factor in &prediction.influential_factors {
        let delta = match factor.impact {
            Impact::Positive => 5.0,
            Impact::Negative => -5.0,
            Impact::Moderate | Impact::Risk => continue,
        };
        match weights.iter_mut().find(|(name, _)| *name == factor.factor) {
            Some((_, weight)) => *weight += delta,
            None => weights.push((factor.factor.clone(), 20.0 + delta)),
        }
    }

    FactorsChart {
        chart_type: "pie".to_string(),
        title: "Factors Affecting Your Yield".to_string(),
        data: ChartSeries::new(weights, &PIE_COLORS),
        insights: prediction.influential_factors.clone(),
    }
}

/// Improvement roadmap from the farmer's current yield
pub fn recommendations(input: &FarmInput, prediction: &YieldPrediction) -> RecommendationsChart {
    let current = prediction.predicted_yield_kg_ha;
    let max_yield = prediction
        .crop_info
        .as_ref()
        .map(|c| c.yield_range_kg_ha.max)
        .unwrap_or(current * 1.3);

    let step = |action: &str, hi: &str, te: &str, percent: f64, cost: &str, benefit: String| Improvement {
        action: action.to_string(),
        action_hi: hi.to_string(),
        action_te: te.to_string(),
        current,
        potential: current * (1.0 + percent / 100.0),
        improvement_percent: percent,
        cost_estimate: cost.to_string(),
        benefit_estimate: benefit,
    };

    let mut improvements = Vec::new();

    if let Some(irrigation) = input.irrigation_percent.filter(|i| *i > 0.0 && *i < 80.0) {
        let percent = ((80.0 - irrigation) * 0.3).min(20.0);
        improvements.push(step(
            "Improve Irrigation",
            "सिंचाई में सुधार",
            "నీటిపారుదల మెరుగుపరచండి",
            percent,
            "Rs 5,000-10,000/acre",
            format!("Rs {}/quintal extra", (percent * 200.0) as i64),
        ));
    }

    let fertilizer_low = match input.fertilizer_kg_ha {
        Some(f) if f != 0.0 => f < 150.0,
        _ => true,
    };
    if fertilizer_low {
        let percent = 15.0;
        improvements.push(step(
            "Optimize Fertilizer",
            "उर्वरक अनुकूलन",
            "ఎరువులను ఆప్టిమైజ్ చేయండి",
            percent,
            "Rs 2,000-3,000/acre",
            format!("Rs {}/quintal extra", (percent * 150.0) as i64),
        ));
    }

    improvements.push(step(
        "Use Certified Seeds",
        "प्रमाणित बीज उपयोग",
        "ధృవీకరించిన విత్తనాలు వాడండి",
        25.0,
        "Rs 500-1,000/acre extra",
        "Rs 4,000-6,000/acre extra income".to_string(),
    ));

    improvements.push(step(
        "Implement IPM",
        "IPM अपनाएं",
        "IPM అమలు చేయండి",
        15.0,
        "Rs 1,500-2,500/acre",
        "40% reduction in pesticide cost + 15% yield increase".to_string(),
    ));

    let total_improvement = if current > 0.0 {
        (max_yield / current - 1.0) * 100.0
    } else {
        0.0
    };

    RecommendationsChart {
        chart_type: "horizontal_bar".to_string(),
        title: "Potential Yield Improvement Roadmap".to_string(),
        current_yield: current,
        max_potential_yield: max_yield,
        improvements,
        summary: RoadmapSummary {
            total_potential_improvement: format!("{:.0}%", total_improvement),
            estimated_additional_income: format!("Rs {}/acre", ((max_yield - current) * 2.0) as i64),
        },
    }
}

fn mentions_any(text: &str, months: &[&str]) -> bool {
    months.iter().any(|m| text.contains(m))
}

fn mark(flags: &mut [u8; 12], months: std::ops::Range<usize>) {
    for m in months {
        flags[m] = 1;
    }
}

/// Month-by-month field activities for a crop
pub fn seasonal(knowledge: &KnowledgeBase, crop: &str) -> Result<SeasonalChart, AppError> {
    let info = knowledge
        .crop(crop)
        .ok_or_else(|| AppError::NotFound(format!("Crop '{}' not found", crop)))?;

    let mut activities = Activities::default();

    for period in info.sowing_months.values() {
        if mentions_any(period, &["June", "July"]) {
            mark(&mut activities.land_prep, 4..6);
            mark(&mut activities.sowing, 5..7);
            mark(&mut activities.growing, 6..10);
        }
        if mentions_any(period, &["October", "November"]) {
            mark(&mut activities.land_prep, 8..10);
            mark(&mut activities.sowing, 9..11);
            mark(&mut activities.growing, 10..12);
            mark(&mut activities.growing, 0..2);
        }
    }

    for period in info.harvest_months.values() {
        if mentions_any(period, &["October", "November"]) {
            mark(&mut activities.harvest, 9..11);
        }
        if mentions_any(period, &["February", "March"]) {
            mark(&mut activities.harvest, 1..4);
        }
    }

    let critical = |stage: &str, tip: &str| CriticalPeriod {
        stage: stage.to_string(),
        tip: tip.to_string(),
    };

    Ok(SeasonalChart {
        chart_type: "calendar".to_string(),
        title: format!("{} - Seasonal Calendar", title_case(crop)),
        crop: crop.to_string(),
        months: MONTHS.iter().map(|m| m.to_string()).collect(),
        activities,
        irrigation_stages: info.irrigation_stages.clone(),
        critical_periods: vec![
            critical("Sowing", "Ensure adequate soil moisture"),
            critical("Flowering", "Critical for yield - avoid water stress"),
            critical("Harvest", "Harvest at right maturity"),
        ],
    })
}

/// Chart builders bound to a predictor
pub struct ChartService<'a> {
    predictor: &'a YieldPredictor,
}

impl<'a> ChartService<'a> {
    pub fn new(predictor: &'a YieldPredictor) -> Self {
        Self { predictor }
    }

    pub fn yield_comparison(&self, input: &FarmInput) -> YieldComparisonChart {
        yield_comparison(input, &self.predictor.predict(input))
    }

    pub fn factors(&self, input: &FarmInput) -> FactorsChart {
        factors(&self.predictor.predict(input))
    }

    pub fn recommendations(&self, input: &FarmInput) -> RecommendationsChart {
        recommendations(input, &self.predictor.predict(input))
    }

    pub fn seasonal(&self, crop: &str) -> Result<SeasonalChart, AppError> {
        seasonal(self.predictor.knowledge(), crop)
    }
}
