//! Request handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::application::services::chart_service::{
    FactorsChart, RecommendationsChart, SeasonalChart, YieldComparisonChart,
};
use crate::application::services::{ChartService, ChatRequest, ChatResponse};
use crate::domain::entities::{
    detect_language, ChatMessage, CropInfo, FarmInput, Language, Range, Scheme, Session, StateInfo,
    YieldPrediction,
};
use crate::infrastructure::knowledge::{title_case, OrderedMap};
use crate::infrastructure::weather::WeatherAdvisory;

const MESSAGE_LIMIT: usize = 100;
const MODEL_DATA_SOURCE: &str = "Government of India - Ministry of Agriculture & Farmers Welfare (2023)";

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub ml_model_loaded: bool,
    pub data_source: String,
    pub supported_languages: Vec<String>,
    pub supported_crops: Vec<String>,
    pub supported_states: Vec<String>,
}

#[derive(Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

impl LanguageQuery {
    /// Unknown or missing codes mean English
    fn language(&self) -> Language {
        self.language
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
pub struct TextQuery {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct DetectedLanguage {
    pub language: Language,
    pub text: String,
}

#[derive(Serialize)]
pub struct CropSummary {
    pub name: String,
    pub name_hi: String,
    pub name_te: String,
    pub optimal_season: Vec<String>,
    pub yield_range: Range,
    pub top_states: Vec<String>,
}

#[derive(Serialize)]
pub struct StateSummary {
    pub name: String,
    pub name_hi: String,
    pub name_te: String,
    pub major_crops: Vec<String>,
    pub rainfall_range: Range,
    pub agri_helpline: String,
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let knowledge = state.predictor.knowledge();
    Json(RootResponse {
        message: "AgroBot Farmer Voice Assistant API".to_string(),
        status: "running".to_string(),
        ml_model_loaded: state.predictor.is_model_loaded(),
        data_source: "Government of India Agricultural Statistics".to_string(),
        supported_languages: Language::ALL.iter().map(|l| l.display_name().to_string()).collect(),
        supported_crops: knowledge.crop_names(),
        supported_states: knowledge.state_names(),
    })
}

pub async fn create_session(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Json<Session> {
    let session = Session::new(query.language());
    if let Err(e) = state.store.create_session(&session).await {
        warn!("Failed to save session {}: {}", session.id, e);
    } else {
        info!("Created session {}", session.id);
    }
    Json(session)
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Session>> {
    let session = state
        .store
        .get_session(&session_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;
    Ok(Json(session))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    Json(state.chat.chat(request).await)
}

pub async fn messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let messages = state
        .store
        .list_messages(&session_id, MESSAGE_LIMIT)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(messages))
}

pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<FarmInput>,
) -> ApiResult<Json<YieldPrediction>> {
    input.validate()?;
    Ok(Json(state.predictor.predict(&input)))
}

pub async fn crops(State(state): State<AppState>) -> Json<Vec<CropSummary>> {
    let crops = state
        .predictor
        .knowledge()
        .crops()
        .map(|(key, info)| CropSummary {
            name: title_case(key),
            name_hi: info.name_hi.clone(),
            name_te: info.name_te.clone(),
            optimal_season: info.optimal_season.clone(),
            yield_range: info.yield_range_kg_ha,
            top_states: info.top_states.clone(),
        })
        .collect();
    Json(crops)
}

pub async fn crop(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CropInfo>> {
    state
        .predictor
        .knowledge()
        .crop(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Crop '{}' not found in knowledge base", name)))
}

pub async fn states(State(state): State<AppState>) -> Json<Vec<StateSummary>> {
    let states = state
        .predictor
        .knowledge()
        .states()
        .map(|(key, info)| StateSummary {
            name: title_case(key),
            name_hi: info.name_hi.clone(),
            name_te: info.name_te.clone(),
            major_crops: info.major_crops.clone(),
            rainfall_range: info.rainfall_mm,
            agri_helpline: info.agri_helpline.clone(),
        })
        .collect();
    Json(states)
}

pub async fn state_details(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<StateInfo>> {
    state
        .predictor
        .knowledge()
        .state(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("State '{}' not found in knowledge base", name)))
}

pub async fn schemes(State(state): State<AppState>) -> Json<OrderedMap<Scheme>> {
    Json(state.predictor.knowledge().schemes().clone())
}

pub async fn pest_disease(
    State(state): State<AppState>,
    Path(issue): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .predictor
        .knowledge()
        .pest_disease(&issue)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No guidance for '{}' in knowledge base", issue)))
}

pub async fn detect(Query(query): Query<TextQuery>) -> Json<DetectedLanguage> {
    Json(DetectedLanguage {
        language: detect_language(&query.text),
        text: query.text,
    })
}

pub async fn model_info(State(state): State<AppState>) -> Json<Value> {
    let Some(model) = state.predictor.model() else {
        return Json(json!({
            "status": "not_loaded",
            "message": "Using knowledge-based predictions"
        }));
    };

    let stats = &model.stats;
    Json(json!({
        "status": "loaded",
        "train_score": stats.train_score,
        "test_score": stats.test_score,
        "n_samples": stats.n_samples,
        "unique_states": stats.unique_states,
        "unique_crops": stats.unique_crops,
        "unique_districts": stats.unique_districts,
        "feature_importance": stats.feature_importance,
        "data_source": MODEL_DATA_SOURCE,
    }))
}

pub async fn weather(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> Json<WeatherAdvisory> {
    Json(state.weather.advisory(&location, query.language()).await)
}

pub async fn yield_comparison_chart(
    State(state): State<AppState>,
    Json(input): Json<FarmInput>,
) -> ApiResult<Json<YieldComparisonChart>> {
    input.validate()?;
    Ok(Json(ChartService::new(&state.predictor).yield_comparison(&input)))
}

pub async fn factors_chart(
    State(state): State<AppState>,
    Json(input): Json<FarmInput>,
) -> ApiResult<Json<FactorsChart>> {
    input.validate()?;
    Ok(Json(ChartService::new(&state.predictor).factors(&input)))
}

pub async fn recommendations_chart(
    State(state): State<AppState>,
    Json(input): Json<FarmInput>,
) -> ApiResult<Json<RecommendationsChart>> {
    input.validate()?;
    Ok(Json(ChartService::new(&state.predictor).recommendations(&input)))
}

pub async fn seasonal_chart(
    State(state): State<AppState>,
    Path(crop): Path<String>,
) -> ApiResult<Json<SeasonalChart>> {
    let chart = ChartService::new(&state.predictor).seasonal(&crop)?;
    Ok(Json(chart))
}
