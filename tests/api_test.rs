//! HTTP API integration tests
//! Run with: cargo test --test api_test

use agrobot::application::services::YieldPredictor;
use agrobot::infrastructure::http::{create_router, AppState};
use agrobot::infrastructure::knowledge::KnowledgeBase;
use agrobot::infrastructure::llm::{ConversationRegistry, LLMConfig, OfflineProvider, OFFLINE_NOTICE};
use agrobot::infrastructure::model::YieldModel;
use agrobot::infrastructure::storage::MemoryStore;
use agrobot::infrastructure::weather::WeatherClient;
use axum_test::TestServer;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

const MODEL_JSON: &str = r#"{
    "encoders": {
        "Crop": ["Rice", "Wheat"],
        "Season": ["Kharif", "Rabi"],
        "Soil_Type": ["Alluvial", "Black"],
        "State": ["Punjab", "Telangana"],
        "District": ["Ludhiana", "Warangal"]
    },
    "stats": {
        "train_score": 0.97,
        "test_score": 0.95,
        "n_samples": 1200,
        "unique_states": 2,
        "unique_crops": 2,
        "unique_districts": 2,
        "feature_importance": {"Irrigation_Percent": 0.6, "Crop_encoded": 0.4}
    },
    "trees": [
        {"nodes": [
            {"type": "split", "feature": 6, "threshold": 50.0, "left": 1, "right": 2},
            {"type": "leaf", "value": 3000.0},
            {"type": "leaf", "value": 4000.0}
        ]},
        {"nodes": [
            {"type": "split", "feature": 6, "threshold": 50.0, "left": 1, "right": 2},
            {"type": "leaf", "value": 3200.0},
            {"type": "leaf", "value": 4400.0}
        ]}
    ]
}"#;

fn test_server(model: Option<YieldModel>, weather_base: &str) -> TestServer {
    let knowledge = Arc::new(KnowledgeBase::builtin().expect("knowledge base"));
    let predictor = Arc::new(YieldPredictor::new(knowledge, model, None));
    let conversations = Arc::new(ConversationRegistry::new(
        LLMConfig::default(),
        Arc::new(OfflineProvider::new()),
    ));
    let weather = Arc::new(WeatherClient::new(weather_base, Duration::from_secs(5)));

    let state = AppState::new(predictor, conversations, Arc::new(MemoryStore::new()), weather);
    TestServer::new(create_router(state)).unwrap()
}

fn offline_server() -> TestServer {
    // Nothing listens here; weather lookups fail fast
    test_server(None, "http://127.0.0.1:9")
}

#[tokio::test]
async fn banner_is_served_with_and_without_slash() {
    let server = offline_server();

    for path in ["/api", "/api/"] {
        let resp = server.get(path).await;
        assert_eq!(resp.status_code(), 200);
        let body: Value = resp.json();
        assert_eq!(body["status"], "running");
        assert_eq!(body["ml_model_loaded"], false);
        assert_eq!(body["supported_languages"], json!(["English", "Hindi", "Telugu"]));
        assert!(body["supported_crops"].as_array().unwrap().contains(&json!("rice")));
        assert!(body["supported_states"].as_array().unwrap().contains(&json!("telangana")));
    }
}

#[tokio::test]
async fn session_lifecycle() {
    let server = offline_server();

    let created = server.post("/api/session").add_query_param("language", "te").await;
    assert_eq!(created.status_code(), 200);
    let session: Value = created.json();
    assert_eq!(session["language"], "te");
    let id = session["id"].as_str().unwrap().to_string();

    let fetched = server.get(&format!("/api/session/{}", id)).await;
    assert_eq!(fetched.status_code(), 200);
    let fetched: Value = fetched.json();
    assert_eq!(fetched["id"], json!(id));

    let missing = server.get("/api/session/does-not-exist").await;
    assert_eq!(missing.status_code(), 404);
    let body: Value = missing.json();
    assert_eq!(body["detail"], "Session not found");
}

#[tokio::test]
async fn chat_records_history() {
    let server = offline_server();

    let resp = server
        .post("/api/chat")
        .json(&json!({
            "session_id": "farmer-1",
            "message": "నా వరి పంటకు ఎంత నీరు కావాలి?",
            "farm_context": {
                "crop_type": "rice",
                "soil_type": "alluvial",
                "season": "kharif",
                "location": "Warangal"
            }
        }))
        .await;
    assert_eq!(resp.status_code(), 200);

    let body: Value = resp.json();
    assert_eq!(body["response"], OFFLINE_NOTICE);
    assert_eq!(body["language"], "te");
    assert_eq!(body["session_id"], "farmer-1");
    assert_eq!(body["knowledge_context"]["crop"]["name"], "rice");
    assert!(body["ml_prediction"]["predicted_yield_kg_ha"].as_f64().unwrap() > 0.0);
    assert_eq!(body["chart_data"]["chart_type"], "bar");
    assert!(body["weather_data"].is_null());

    let history: Value = server.get("/api/messages/farmer-1").await.json();
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["role"], "user");
    assert_eq!(history[1]["role"], "assistant");

    let empty: Value = server.get("/api/messages/nobody").await.json();
    assert_eq!(empty, json!([]));
}

#[tokio::test]
async fn predict_without_model_uses_knowledge() {
    let server = offline_server();

    let resp = server
        .post("/api/predict")
        .json(&json!({
            "crop_type": "wheat",
            "soil_type": "alluvial",
            "season": "rabi",
            "location": "Ludhiana",
            "irrigation_percent": 90
        }))
        .await;
    assert_eq!(resp.status_code(), 200);

    let body: Value = resp.json();
    assert_eq!(body["confidence_score"], 0.75);
    assert!(body["crop_info"].is_object());
    assert!(body["influential_factors"].as_array().unwrap().len() <= 5);
    assert!(body["recommendations"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn predict_with_loaded_model() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MODEL_JSON.as_bytes()).unwrap();
    let model = YieldModel::load(file.path()).unwrap();
    let server = test_server(Some(model), "http://127.0.0.1:9");

    let body: Value = server
        .post("/api/predict")
        .json(&json!({
            "crop_type": "wheat",
            "soil_type": "alluvial",
            "season": "rabi",
            "location": "Ludhiana",
            "irrigation_percent": 80
        }))
        .await
        .json();
    assert_eq!(body["predicted_yield_kg_ha"], 4200.0);
    assert_eq!(body["confidence_score"], 0.92);

    let info: Value = server.get("/api/model-info").await.json();
    assert_eq!(info["status"], "loaded");
    assert_eq!(info["n_samples"], 1200);
    assert_eq!(
        info["data_source"],
        "Government of India - Ministry of Agriculture & Farmers Welfare (2023)"
    );
}

#[tokio::test]
async fn model_info_without_model() {
    let body: Value = offline_server().get("/api/model-info").await.json();
    assert_eq!(
        body,
        json!({"status": "not_loaded", "message": "Using knowledge-based predictions"})
    );
}

#[tokio::test]
async fn knowledge_endpoints() {
    let server = offline_server();

    let crops: Value = server.get("/api/crops").await.json();
    let rice = crops
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Rice")
        .expect("rice summary");
    assert!(rice["yield_range"]["avg"].is_number());

    let cotton = server.get("/api/crops/Cotton").await;
    assert_eq!(cotton.status_code(), 200);
    let cotton: Value = cotton.json();
    assert!(cotton["major_pests"].is_array());

    let missing = server.get("/api/crops/quinoa").await;
    assert_eq!(missing.status_code(), 404);
    let body: Value = missing.json();
    assert_eq!(body["detail"], "Crop 'quinoa' not found in knowledge base");

    let states: Value = server.get("/api/states").await.json();
    assert!(states.as_array().unwrap().iter().any(|s| s["name"] == "Punjab"));
    assert_eq!(server.get("/api/states/punjab").await.status_code(), 200);
    assert_eq!(server.get("/api/states/atlantis").await.status_code(), 404);

    let schemes: Value = server.get("/api/schemes").await.json();
    assert!(schemes.as_object().unwrap().len() >= 1);
}

#[tokio::test]
async fn impossible_farm_inputs_are_rejected() {
    let server = offline_server();
    let farm = json!({
        "crop_type": "wheat",
        "soil_type": "alluvial",
        "season": "rabi",
        "location": "Ludhiana",
        "irrigation_percent": -10
    });

    let resp = server.post("/api/predict").json(&farm).await;
    assert_eq!(resp.status_code(), 400);
    let body: Value = resp.json();
    assert_eq!(body["detail"], "irrigation_percent must be a non-negative number");

    let chart = server.post("/api/chart-data/factors").json(&farm).await;
    assert_eq!(chart.status_code(), 400);

    let mut flooded = farm.clone();
    flooded["irrigation_percent"] = json!(150);
    let resp = server.post("/api/chart-data/yield-comparison").json(&flooded).await;
    assert_eq!(resp.status_code(), 400);
}

#[tokio::test]
async fn crops_are_listed_in_knowledge_base_order() {
    let server = offline_server();

    let crops: Value = server.get("/api/crops").await.json();
    let names: Vec<&str> = crops
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 24);
    assert_eq!(&names[..3], &["Chickpea", "Pigeon_Pea", "Lentil"]);

    let banner: Value = server.get("/api").await.json();
    assert_eq!(banner["supported_crops"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn detect_language_endpoint() {
    let server = offline_server();

    let body: Value = server
        .post("/api/detect-language")
        .add_query_param("text", "मेरी फसल")
        .await
        .json();
    assert_eq!(body, json!({"language": "hi", "text": "मेरी फसल"}));
}

#[tokio::test]
async fn chart_endpoints() {
    let server = offline_server();
    let farm = json!({
        "crop_type": "rice",
        "soil_type": "clay",
        "season": "kharif",
        "location": "Guntur",
        "irrigation_percent": 30,
        "fertilizer_kg_ha": 90
    });

    let comparison: Value = server.post("/api/chart-data/yield-comparison").json(&farm).await.json();
    assert_eq!(comparison["chart_type"], "bar");

    let factors = server.post("/api/chart-data/factors").json(&farm).await;
    assert_eq!(factors.status_code(), 200);

    let recommendations = server.post("/api/chart-data/recommendations").json(&farm).await;
    assert_eq!(recommendations.status_code(), 200);

    let seasonal: Value = server.get("/api/chart-data/seasonal/rice").await.json();
    assert_eq!(seasonal["chart_type"], "calendar");
    assert_eq!(seasonal["months"].as_array().unwrap().len(), 12);

    assert_eq!(server.get("/api/chart-data/seasonal/quinoa").await.status_code(), 404);
}

#[tokio::test]
async fn weather_endpoint_localizes_advisories() {
    let mock_server = MockServer::start_async().await;
    let forecast = mock_server
        .mock_async(|when, then| {
            when.method(GET).path("/forecast").query_param("timezone", "Asia/Kolkata");
            then.status(200).json_body(json!({
                "current": {
                    "temperature_2m": 42.0,
                    "relative_humidity_2m": 30,
                    "precipitation": 0.0,
                    "weather_code": 0,
                    "wind_speed_10m": 5.0
                },
                "daily": {
                    "time": ["2024-05-01", "2024-05-02"],
                    "temperature_2m_max": [43.0, 44.0],
                    "temperature_2m_min": [29.0, 30.0],
                    "precipitation_sum": [0.0, 0.0],
                    "precipitation_probability_max": [0, 5],
                    "weather_code": [0, 1]
                }
            }));
        })
        .await;

    let server = test_server(None, &mock_server.base_url());

    let body: Value = server
        .get("/api/weather/Warangal")
        .add_query_param("language", "hi")
        .await
        .json();
    forecast.assert_async().await;

    assert_eq!(body["error"], false);
    assert_eq!(body["current"]["condition"], "Clear sky");
    assert_eq!(body["forecast_7day"].as_array().unwrap().len(), 2);
    let kinds: Vec<&str> = body["advisories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["heat_stress", "dry_spell", "spray_favorable"]);
    assert!(body["advisories"][0]["message"].as_str().unwrap().contains("गर्मी"));
}

#[tokio::test]
async fn weather_for_unknown_location_is_unavailable() {
    let server = offline_server();
    let body: Value = server.get("/api/weather/Atlantis").await.json();
    assert_eq!(body["error"], true);
    assert!(body["message"].is_string());
}
