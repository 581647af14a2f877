//! Historical crop statistics
//!
//! Rows from the government production dataset the model was trained on.
//! Only the columns needed for averages are kept in memory.

use serde::Deserialize;
use std::path::Path;

use crate::application::errors::ModelError;

#[derive(Debug, Clone, Deserialize)]
pub struct CropRecord {
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "District", default)]
    pub district: String,
    #[serde(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "Yield_Kg_Ha")]
    pub yield_kg_ha: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CropStatistics {
    records: Vec<CropRecord>,
}

impl CropStatistics {
    pub fn new(records: Vec<CropRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_reader(reader)
    }

    pub fn from_csv(content: &str) -> Result<Self, ModelError> {
        Self::from_reader(csv::Reader::from_reader(content.as_bytes()))
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, ModelError> {
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn crop_rows<'a>(&'a self, crop: &str) -> impl Iterator<Item = &'a CropRecord> + 'a {
        let crop = crop.trim().to_lowercase();
        self.records
            .iter()
            .filter(move |r| r.crop.to_lowercase() == crop)
    }

    /// Mean yield of every row for the crop
    pub fn national_average(&self, crop: &str) -> Option<f64> {
        mean(self.crop_rows(crop).map(|r| r.yield_kg_ha))
    }

    /// Mean yield for the crop in rows whose state contains the first five
    /// characters of `state`
    pub fn state_average(&self, crop: &str, state: &str) -> Option<f64> {
        let prefix: String = state.to_lowercase().chars().take(5).collect();
        mean(
            self.crop_rows(crop)
                .filter(|r| r.state.to_lowercase().contains(&prefix))
                .map(|r| r.yield_kg_ha),
        )
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_CSV: &str = "\
State,District,Crop,Season,Soil_Type,Rainfall_mm,Irrigation_Percent,Fertilizer_Kg_Ha,Temperature_C,Yield_Kg_Ha
Punjab,Ludhiana,Wheat,Rabi,Alluvial,650,98,180,20,5000
Punjab,Amritsar,Wheat,Rabi,Alluvial,600,97,170,19,4800
Uttar Pradesh,Meerut,Wheat,Rabi,Alluvial,800,80,150,22,3500
Telangana,Warangal,Rice,Kharif,Black,900,70,140,28,3200
";

    #[test]
    fn test_national_average() {
        let stats = CropStatistics::from_csv(SAMPLE_CSV).unwrap();
        assert_eq!(stats.len(), 4);
        assert!((stats.national_average("wheat").unwrap() - 4433.333).abs() < 0.01);
        assert_eq!(stats.national_average("RICE"), Some(3200.0));
        assert_eq!(stats.national_average("cotton"), None);
    }

    #[test]
    fn test_state_average_uses_prefix() {
        let stats = CropStatistics::from_csv(SAMPLE_CSV).unwrap();
        assert_eq!(stats.state_average("wheat", "punjab"), Some(4900.0));
        // "uttar" matches "Uttar Pradesh" even for a longer resolved name
        assert_eq!(stats.state_average("wheat", "uttar pradesh"), Some(3500.0));
        assert_eq!(stats.state_average("wheat", "kerala"), None);
    }

    #[test]
    fn test_rejects_malformed_rows() {
        let csv = "State,District,Crop,Yield_Kg_Ha\nPunjab,Ludhiana,Wheat,lots\n";
        assert!(matches!(CropStatistics::from_csv(csv), Err(ModelError::Csv(_))));
    }
}
