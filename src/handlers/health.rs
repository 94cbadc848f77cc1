//! Health and status handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::logic::model::ModelStatus;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_loaded: bool,
}

pub async fn home() -> &'static str {
    "AI Pest Detection Backend is running"
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_loaded: state.model.is_loaded(),
    })
}

/// Model and label map status
pub async fn model_status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.model.status())
}
