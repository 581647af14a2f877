use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Banner
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))

        // Sessions and chat
        .route("/api/session", post(handlers::create_session))
        .route("/api/session/{id}", get(handlers::get_session))
        .route("/api/chat", post(handlers::chat))
        .route("/api/messages/{session_id}", get(handlers::messages))

        // Prediction
        .route("/api/predict", post(handlers::predict))
        .route("/api/model-info", get(handlers::model_info))

        // Knowledge base
        .route("/api/crops", get(handlers::crops))
        .route("/api/crops/{name}", get(handlers::crop))
        .route("/api/states", get(handlers::states))
        .route("/api/states/{name}", get(handlers::state_details))
        .route("/api/schemes", get(handlers::schemes))
        .route("/api/pest-disease/{issue}", get(handlers::pest_disease))
        .route("/api/detect-language", post(handlers::detect))

        // Weather
        .route("/api/weather/{location}", get(handlers::weather))

        // Charts
        .route("/api/chart-data/yield-comparison", post(handlers::yield_comparison_chart))
        .route("/api/chart-data/factors", post(handlers::factors_chart))
        .route("/api/chart-data/recommendations", post(handlers::recommendations_chart))
        .route("/api/chart-data/seasonal/{crop}", get(handlers::seasonal_chart))

        .with_state(state)

        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
