//! Chat orchestration

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::chart_service::{self, YieldComparisonChart};
use super::context::build_context_message;
use super::yield_service::YieldPredictor;
use crate::domain::entities::{
    detect_language, ChatMessage, FarmContext, FarmInput, Language, YieldPrediction,
};
use crate::domain::traits::SessionStore;
use crate::infrastructure::llm::ConversationRegistry;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub farm_context: Option<FarmContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropContext {
    pub name: String,
    pub optimal_season: Vec<String>,
    pub top_states: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeContext {
    pub crop: CropContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub language: Language,
    pub session_id: String,
    pub ml_prediction: Option<YieldPrediction>,
    pub knowledge_context: Option<KnowledgeContext>,
    pub weather_data: Option<serde_json::Value>,
    pub chart_data: Option<YieldComparisonChart>,
}

/// Explicit code first, detection otherwise
pub fn resolve_language(requested: Option<&str>, message: &str) -> Language {
    requested
        .and_then(Language::from_code)
        .unwrap_or_else(|| detect_language(message))
}

pub struct ChatService {
    predictor: Arc<YieldPredictor>,
    conversations: Arc<ConversationRegistry>,
    store: Arc<dyn SessionStore>,
}

impl ChatService {
    pub fn new(
        predictor: Arc<YieldPredictor>,
        conversations: Arc<ConversationRegistry>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            predictor,
            conversations,
            store,
        }
    }

    pub async fn chat(&self, request: ChatRequest) -> ChatResponse {
        let language = resolve_language(request.language.as_deref(), &request.message);
        let farm_context = request.farm_context.as_ref();

        let enriched = build_context_message(&request.message, farm_context, language, &self.predictor);
        debug!("Session {} enriched message is {} chars", request.session_id, enriched.len());

        let response = self.conversations.send(&request.session_id, enriched).await;

        // The reply's prediction is made without the context temperature,
        // so the model sees the default
        let farm_input = farm_context
            .and_then(FarmInput::from_context)
            .map(|input| FarmInput {
                temperature_c: None,
                ..input
            })
            .filter(|input| match input.validate() {
                Ok(()) => true,
                Err(e) => {
                    debug!("Session {} farm context skipped: {}", request.session_id, e);
                    false
                }
            });
        let ml_prediction = farm_input.as_ref().map(|input| self.predictor.predict(input));
        let chart_data = farm_input
            .as_ref()
            .zip(ml_prediction.as_ref())
            .map(|(input, prediction)| chart_service::yield_comparison(input, prediction));

        let knowledge_context = farm_context.and_then(|context| self.knowledge_context(context));

        let messages = [
            ChatMessage::user(&request.session_id, &request.message, language),
            ChatMessage::assistant(&request.session_id, &response, language),
        ];
        if let Err(e) = self.store.append_messages(&messages).await {
            warn!("Failed to save messages for session {}: {}", request.session_id, e);
        }

        ChatResponse {
            response,
            language,
            session_id: request.session_id,
            ml_prediction,
            knowledge_context,
            weather_data: None,
            chart_data,
        }
    }

    fn knowledge_context(&self, context: &FarmContext) -> Option<KnowledgeContext> {
        let name = context.get("crop_type")?.as_str()?;
        let crop = self.predictor.knowledge().crop(name)?;
        Some(KnowledgeContext {
            crop: CropContext {
                name: name.to_string(),
                optimal_season: crop.optimal_season.clone(),
                top_states: crop.top_states.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Role;
    use crate::infrastructure::knowledge::KnowledgeBase;
    use crate::infrastructure::llm::{LLMConfig, OfflineProvider, OFFLINE_NOTICE};
    use crate::infrastructure::storage::MemoryStore;
    use serde_json::json;

    fn service(store: Arc<MemoryStore>) -> ChatService {
        let predictor = Arc::new(YieldPredictor::new(
            Arc::new(KnowledgeBase::builtin().unwrap()),
            None,
            None,
        ));
        let conversations = Arc::new(ConversationRegistry::new(
            LLMConfig::default(),
            Arc::new(OfflineProvider::new()),
        ));
        ChatService::new(predictor, conversations, store)
    }

    #[test]
    fn test_language_resolution() {
        assert_eq!(resolve_language(Some("te"), "hello"), Language::Te);
        assert_eq!(resolve_language(Some("xx"), "mera fasal"), Language::Hi);
        assert_eq!(resolve_language(None, "When should I sow?"), Language::En);
    }

    #[tokio::test]
    async fn test_chat_without_context() {
        let store = Arc::new(MemoryStore::new());
        let response = service(store.clone())
            .chat(ChatRequest {
                session_id: "s1".to_string(),
                message: "When should I sow wheat?".to_string(),
                language: None,
                farm_context: None,
            })
            .await;

        assert_eq!(response.response, OFFLINE_NOTICE);
        assert_eq!(response.language, Language::En);
        assert!(response.ml_prediction.is_none());
        assert!(response.chart_data.is_none());

        let stored = store.list_messages("s1", 100).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].role, Role::User);
        assert_eq!(stored[0].content, "When should I sow wheat?");
        assert_eq!(stored[1].content, OFFLINE_NOTICE);
    }

    #[tokio::test]
    async fn test_chat_with_full_context() {
        let context = match json!({
            "crop_type": "cotton",
            "soil_type": "black",
            "season": "kharif",
            "location": "Nagpur",
            "irrigation_percent": 30
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };

        let response = service(Arc::new(MemoryStore::new()))
            .chat(ChatRequest {
                session_id: "s2".to_string(),
                message: "मेरी फसल कैसी होगी?".to_string(),
                language: None,
                farm_context: Some(context),
            })
            .await;

        assert_eq!(response.language, Language::Hi);
        let prediction = response.ml_prediction.unwrap();
        assert_eq!(prediction.confidence_score, 0.75);
        let knowledge = response.knowledge_context.unwrap();
        assert_eq!(knowledge.crop.name, "cotton");
        let chart = response.chart_data.unwrap();
        assert_eq!(chart.data.values[0], prediction.predicted_yield_kg_ha);
    }

    #[tokio::test]
    async fn test_reply_prediction_ignores_context_temperature() {
        use crate::infrastructure::model::YieldModel;

        // Splits on temperature: <= 30 -> 2000, above -> 6000
        let model = YieldModel::from_json(
            &json!({
                "encoders": {},
                "stats": {
                    "train_score": 0.9,
                    "test_score": 0.9,
                    "n_samples": 10,
                    "unique_states": 1,
                    "unique_crops": 1,
                    "feature_importance": {}
                },
                "trees": [{"nodes": [
                    {"type": "split", "feature": 8, "threshold": 30.0, "left": 1, "right": 2},
                    {"type": "leaf", "value": 2000.0},
                    {"type": "leaf", "value": 6000.0}
                ]}]
            })
            .to_string(),
        )
        .unwrap();
        let predictor = Arc::new(YieldPredictor::new(
            Arc::new(KnowledgeBase::builtin().unwrap()),
            Some(model),
            None,
        ));
        let conversations = Arc::new(ConversationRegistry::new(
            LLMConfig::default(),
            Arc::new(OfflineProvider::new()),
        ));
        let service = ChatService::new(predictor, conversations, Arc::new(MemoryStore::new()));

        let context = match json!({
            "crop_type": "rice",
            "soil_type": "clay",
            "season": "kharif",
            "location": "Warangal",
            "temperature_c": 38
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };

        let response = service
            .chat(ChatRequest {
                session_id: "s3".to_string(),
                message: "How is my rice?".to_string(),
                language: Some("en".to_string()),
                farm_context: Some(context),
            })
            .await;

        // 27°C default, not the 38°C in the context
        assert_eq!(response.ml_prediction.unwrap().predicted_yield_kg_ha, 2000.0);
    }

    #[tokio::test]
    async fn test_impossible_context_skips_prediction() {
        let context = match json!({
            "crop_type": "cotton",
            "soil_type": "black",
            "season": "kharif",
            "location": "Nagpur",
            "irrigation_percent": -20
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };

        let response = service(Arc::new(MemoryStore::new()))
            .chat(ChatRequest {
                session_id: "s4".to_string(),
                message: "How is my cotton?".to_string(),
                language: Some("en".to_string()),
                farm_context: Some(context),
            })
            .await;

        assert_eq!(response.response, OFFLINE_NOTICE);
        assert!(response.ml_prediction.is_none());
        assert!(response.chart_data.is_none());
        assert_eq!(response.knowledge_context.unwrap().crop.name, "cotton");
    }
}
