//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::infrastructure::llm::LLMConfig;
use crate::infrastructure::weather::DEFAULT_BASE_URL;

/// Service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub weather: WeatherConfig,
    pub model: ModelConfig,
    pub knowledge: KnowledgeConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ModelConfig {
    /// Exported forest and encoders
    pub artifact: PathBuf,
    /// Historical yields used for state and national averages
    pub crop_data: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact: PathBuf::from("models/yield_model.json"),
            crop_data: PathBuf::from("data/india_crop_data.csv"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct KnowledgeConfig {
    /// Replaces the built-in knowledge base when set
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Keep sessions in memory only
    pub in_memory: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("agrobot.db"),
            in_memory: false,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Environment variables win over file values
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.llm.apply_env();

        if let Ok(host) = std::env::var("AGROBOT_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("AGROBOT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("AGROBOT_PORT={}", port)))?;
        }

        if let Ok(path) = std::env::var("AGROBOT_DB") {
            self.database.path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("YIELD_MODEL_PATH") {
            self.model.artifact = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("CROP_DATA_PATH") {
            self.model.crop_data = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("KNOWLEDGE_PATH") {
            self.knowledge.path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::MissingField("server.host".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "server:\n  port: 9000\nllm:\n  model: gpt-4o-mini\n  max-tokens: 500\n",
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, Some(500));
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.weather.base_url, DEFAULT_BASE_URL);
        assert!(config.knowledge.path.is_none());
    }

    #[test]
    fn test_default_yaml_roundtrip() {
        let yaml = Config::default().to_yaml().unwrap();
        assert!(yaml.contains("openrouter-base"));
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.bind_address(), "0.0.0.0:8001");
        assert_eq!(parsed.model.artifact, PathBuf::from("models/yield_model.json"));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.llm.temperature = 3.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_rejects_bad_yaml() {
        assert!(matches!(Config::from_yaml("server: [1, 2"), Err(ConfigError::Parse(_))));
    }
}
