//! Weather and field advisories from Open-Meteo
//!
//! Open-Meteo needs no key. One forecast request per advisory: current
//! readings plus a seven day daily forecast in India time.

pub mod advisory;
pub mod locations;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::application::errors::AppError;
use crate::domain::entities::Language;

pub use advisory::{advisories, condition, Advisory, Conditions, LocalizedAdvisory};
pub use locations::{coordinates, Coordinates};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1";
pub const DATA_SOURCE: &str = "Open-Meteo Weather API";
const UNAVAILABLE: &str = "Could not fetch weather data for this location";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,precipitation,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,precipitation_probability_max,weather_code";
const TIMEZONE: &str = "Asia/Kolkata";
const FORECAST_DAYS: usize = 7;

/// Raw forecast response
#[derive(Debug, Default, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: CurrentBlock,
    #[serde(default)]
    daily: DailyBlock,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    precipitation: Option<f64>,
    weather_code: Option<i64>,
    wind_speed_10m: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailyBlock {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    weather_code: Vec<Option<i64>>,
}

fn nth<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: String,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub rain_probability: Option<f64>,
    pub condition: String,
}

/// Weather for one location with advisories in every language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: String,
    pub coordinates: Coordinates,
    pub current: CurrentWeather,
    pub forecast: Vec<DailyForecast>,
    pub agricultural_advisory: Vec<Advisory>,
}

impl WeatherReport {
    fn from_response(location: &str, coordinates: Coordinates, response: ForecastResponse) -> Self {
        let current = CurrentWeather {
            temperature_c: response.current.temperature_2m,
            humidity_percent: response.current.relative_humidity_2m,
            precipitation_mm: response.current.precipitation,
            wind_speed_kmh: response.current.wind_speed_10m,
            condition: condition(response.current.weather_code.unwrap_or(0)).to_string(),
        };

        let daily = &response.daily;
        let forecast: Vec<DailyForecast> = daily
            .time
            .iter()
            .take(FORECAST_DAYS)
            .enumerate()
            .map(|(i, date)| DailyForecast {
                date: date.clone(),
                max_temp_c: nth(&daily.temperature_2m_max, i),
                min_temp_c: nth(&daily.temperature_2m_min, i),
                precipitation_mm: nth(&daily.precipitation_sum, i),
                rain_probability: nth(&daily.precipitation_probability_max, i),
                condition: nth(&daily.weather_code, i).map(condition).unwrap_or("Unknown").to_string(),
            })
            .collect();

        let conditions = Conditions {
            temperature_c: current.temperature_c,
            humidity_percent: current.humidity_percent,
            wind_speed_kmh: current.wind_speed_kmh,
            rain_7day_mm: forecast.iter().filter_map(|d| d.precipitation_mm).sum(),
        };

        Self {
            location: location.to_string(),
            coordinates,
            current,
            forecast,
            agricultural_advisory: advisories(&conditions),
        }
    }
}

/// What the advisory endpoint returns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeatherAdvisory {
    Unavailable {
        error: bool,
        message: String,
    },
    Available {
        error: bool,
        location: String,
        current: CurrentWeather,
        forecast_7day: Vec<DailyForecast>,
        advisories: Vec<LocalizedAdvisory>,
        data_source: String,
    },
}

impl WeatherAdvisory {
    pub fn unavailable() -> Self {
        WeatherAdvisory::Unavailable {
            error: true,
            message: UNAVAILABLE.to_string(),
        }
    }

    pub fn from_report(report: WeatherReport, language: Language) -> Self {
        let advisories = report
            .agricultural_advisory
            .iter()
            .map(|a| a.localize(language))
            .collect();

        WeatherAdvisory::Available {
            error: false,
            location: report.location,
            current: report.current,
            forecast_7day: report.forecast,
            advisories,
            data_source: DATA_SOURCE.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, WeatherAdvisory::Unavailable { .. })
    }
}

pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast", self.base_url)
    }

    async fn fetch(&self, coords: Coordinates) -> Result<ForecastResponse, AppError> {
        let forecast_days = FORECAST_DAYS.to_string();
        let latitude = coords.lat.to_string();
        let longitude = coords.lon.to_string();

        let response = self
            .client
            .get(self.forecast_url())
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("daily", DAILY_FIELDS),
                ("timezone", TIMEZONE),
                ("forecast_days", forecast_days.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Weather(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Weather(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| AppError::Weather(format!("Failed to parse forecast: {}", e)))
    }

    /// `Ok(None)` for locations without known coordinates
    pub async fn report(&self, location: &str) -> Result<Option<WeatherReport>, AppError> {
        let Some(coords) = coordinates(location) else {
            debug!("No coordinates for '{}'", location);
            return Ok(None);
        };

        let response = self.fetch(coords).await?;
        Ok(Some(WeatherReport::from_response(location, coords, response)))
    }

    /// Report localized for the farmer; every failure becomes the unavailable form
    pub async fn advisory(&self, location: &str, language: Language) -> WeatherAdvisory {
        match self.report(location).await {
            Ok(Some(report)) => WeatherAdvisory::from_report(report, language),
            Ok(None) => WeatherAdvisory::unavailable(),
            Err(e) => {
                warn!("Weather lookup for '{}' failed: {}", location, e);
                WeatherAdvisory::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> ForecastResponse {
        serde_json::from_value(json!({
            "current": {
                "temperature_2m": 36.5,
                "relative_humidity_2m": 40,
                "precipitation": 0.0,
                "weather_code": 2,
                "wind_speed_10m": 12.0
            },
            "daily": {
                "time": ["2024-06-01", "2024-06-02", "2024-06-03"],
                "temperature_2m_max": [38.0, 37.1, null],
                "temperature_2m_min": [27.0, 26.4, 25.0],
                "precipitation_sum": [20.0, 35.5, null],
                "precipitation_probability_max": [60, 80, 10],
                "weather_code": [61, 63, 0]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_report_from_response() {
        let coords = coordinates("warangal").unwrap();
        let report = WeatherReport::from_response("Warangal", coords, sample_response());

        assert_eq!(report.current.condition, "Partly cloudy");
        assert_eq!(report.forecast.len(), 3);
        assert_eq!(report.forecast[1].condition, "Moderate rain");
        assert_eq!(report.forecast[2].max_temp_c, None);

        let kinds: Vec<&str> = report.agricultural_advisory.iter().map(|a| a.kind.as_str()).collect();
        // 36.5°C and 55.5mm over the week, moderate wind
        assert_eq!(kinds, vec!["heat_advisory", "rain_expected"]);
    }

    #[test]
    fn test_advisory_serializes_flat() {
        let coords = coordinates("warangal").unwrap();
        let report = WeatherReport::from_response("Warangal", coords, sample_response());
        let value = serde_json::to_value(WeatherAdvisory::from_report(report, Language::Hi)).unwrap();

        assert_eq!(value["error"], json!(false));
        assert_eq!(value["data_source"], json!(DATA_SOURCE));
        assert_eq!(value["forecast_7day"].as_array().unwrap().len(), 3);
        assert_eq!(value["advisories"][0]["type"], json!("heat_advisory"));
        assert_eq!(value["advisories"][0]["message"], json!("उच्च तापमान। नर्सरी को छाया दें। पानी बचाने के लिए मल्चिंग करें।"));

        let unavailable = serde_json::to_value(WeatherAdvisory::unavailable()).unwrap();
        assert_eq!(unavailable, json!({"error": true, "message": UNAVAILABLE}));
    }
}
