//! Trained yield model artifact
//!
//! The regressor is trained offline and exported as JSON: one label encoder
//! per categorical column, training statistics and a forest of regression
//! trees. This module only reads and evaluates it.

pub mod stats;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::application::errors::ModelError;

pub use stats::CropStatistics;

/// Categorical feature columns, in artifact naming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    State,
    District,
    Crop,
    Season,
    SoilType,
}

impl Column {
    pub fn key(&self) -> &'static str {
        match self {
            Column::State => "State",
            Column::District => "District",
            Column::Crop => "Crop",
            Column::Season => "Season",
            Column::SoilType => "Soil_Type",
        }
    }
}

/// Model inputs in training column order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub state: usize,
    pub district: usize,
    pub crop: usize,
    pub season: usize,
    pub soil: usize,
    pub rainfall_mm: f64,
    pub irrigation_percent: f64,
    pub fertilizer_kg_ha: f64,
    pub temperature_c: f64,
}

impl Features {
    pub const COUNT: usize = 9;

    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [
            self.state as f64,
            self.district as f64,
            self.crop as f64,
            self.season as f64,
            self.soil as f64,
            self.rainfall_mm,
            self.irrigation_percent,
            self.fertilizer_kg_ha,
            self.temperature_c,
        ]
    }
}

/// Training run summary
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainingStats {
    pub train_score: f64,
    pub test_score: f64,
    pub n_samples: u64,
    pub unique_states: u64,
    pub unique_crops: u64,
    #[serde(default)]
    pub unique_districts: u64,
    pub feature_importance: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegressionTree {
    /// Node 0 is the root
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn predict(&self, x: &[f64]) -> Result<f64, ModelError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in at most `nodes.len()` steps
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let v = x.get(*feature).ok_or_else(|| {
                        ModelError::Invalid(format!("feature index {} out of range", feature))
                    })?;
                    index = if *v <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ModelError::Invalid(format!("node index {} out of range", index)));
                }
            }
        }
        Err(ModelError::Invalid("tree contains a cycle".to_string()))
    }
}

/// The exported artifact
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct YieldModel {
    /// Column name to sorted class labels; a label's index is its code
    pub encoders: BTreeMap<String, Vec<String>>,
    pub stats: TrainingStats,
    pub trees: Vec<RegressionTree>,
}

impl YieldModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let model: YieldModel = serde_json::from_str(content)?;
        if model.trees.is_empty() {
            return Err(ModelError::Invalid("artifact has no trees".to_string()));
        }
        Ok(model)
    }

    /// Case-insensitive label lookup. `None` when the column or label is unknown.
    pub fn encode(&self, column: Column, label: &str) -> Option<usize> {
        let wanted = label.trim().to_lowercase();
        self.encoders
            .get(column.key())?
            .iter()
            .position(|class| class.to_lowercase() == wanted)
    }

    /// Mean of the per-tree predictions
    pub fn predict(&self, features: &Features) -> Result<f64, ModelError> {
        let x = features.to_array();
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict(&x)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}
