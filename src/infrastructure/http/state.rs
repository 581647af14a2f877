//! Shared handler state and its construction from config

use std::sync::Arc;
use tracing::{info, warn};

use crate::application::errors::{AppError, StorageError};
use crate::application::services::{ChatService, YieldPredictor};
use crate::domain::traits::SessionStore;
use crate::infrastructure::config::Config;
use crate::infrastructure::database::Database;
use crate::infrastructure::knowledge::KnowledgeBase;
use crate::infrastructure::llm::ConversationRegistry;
use crate::infrastructure::model::{CropStatistics, YieldModel};
use crate::infrastructure::storage::MemoryStore;
use crate::infrastructure::weather::WeatherClient;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<YieldPredictor>,
    pub chat: Arc<ChatService>,
    pub store: Arc<dyn SessionStore>,
    pub weather: Arc<WeatherClient>,
}

impl AppState {
    pub fn new(
        predictor: Arc<YieldPredictor>,
        conversations: Arc<ConversationRegistry>,
        store: Arc<dyn SessionStore>,
        weather: Arc<WeatherClient>,
    ) -> Self {
        let chat = Arc::new(ChatService::new(predictor.clone(), conversations, store.clone()));
        Self {
            predictor,
            chat,
            store,
            weather,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let predictor = Arc::new(load_predictor(config)?);
        let conversations = Arc::new(ConversationRegistry::from_config(config.llm.clone()));
        info!("Using {} LLM provider", conversations.provider_name());

        let store = open_store(config)?;
        let weather = Arc::new(WeatherClient::new(&config.weather.base_url, config.weather.timeout()));

        Ok(Self::new(predictor, conversations, store, weather))
    }
}

/// Knowledge is required; the model and crop statistics are optional
pub fn load_predictor(config: &Config) -> Result<YieldPredictor, AppError> {
    let knowledge = match &config.knowledge.path {
        Some(path) => {
            info!("Loading knowledge base from {}", path.display());
            KnowledgeBase::load(path)?
        }
        None => KnowledgeBase::builtin()?,
    };

    let model = match YieldModel::load(&config.model.artifact) {
        Ok(model) => {
            info!(
                "Yield model loaded. Training R²: {:.4}",
                model.stats.train_score
            );
            Some(model)
        }
        Err(e) => {
            warn!(
                "Could not load yield model from {}: {}. Using knowledge-based predictions.",
                config.model.artifact.display(),
                e
            );
            None
        }
    };

    let stats = match CropStatistics::load(&config.model.crop_data) {
        Ok(stats) => {
            info!("Loaded {} historical crop records", stats.len());
            Some(stats)
        }
        Err(e) => {
            warn!(
                "Could not load crop data from {}: {}",
                config.model.crop_data.display(),
                e
            );
            None
        }
    };

    Ok(YieldPredictor::new(Arc::new(knowledge), model, stats))
}

pub fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>, AppError> {
    if config.database.in_memory {
        info!("Sessions are kept in memory");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let db = Database::new(&config.database.path).map_err(StorageError::from)?;
    info!("Sessions stored in {}", config.database.path.display());
    Ok(Arc::new(db))
}
