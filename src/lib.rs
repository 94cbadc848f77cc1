//! Pest Monitor Backend
//!
//! Leaf image pest detection, field sensor readings and threshold alerts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PEST MONITOR                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │  API      │  │  Inference   │  │  Alert Rules         │  │
//! │  │  (Axum)   │─▶│  (ONNX, CNN) │─▶│  (risk, sensors)     │  │
//! │  └─────┬─────┘  └──────────────┘  └──────────┬───────────┘  │
//! │        └──────────────────┬──────────────────┘              │
//! │                           ▼                                 │
//! │                    ┌─────────────┐                          │
//! │                    │   SQLite    │                          │
//! │                    └─────────────┘                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};

use logic::model::ModelState;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub config: config::Config,
    pub model: Arc<ModelState>,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::check))
        .route("/api/status", get(handlers::health::model_status))
        // Auth
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        // Detection and sensors
        .route("/predict", post(handlers::predict::predict))
        .route("/add_sensor", post(handlers::sensors::add_sensor))
        // History
        .route("/api/pests", get(handlers::history::list_pests))
        .route("/api/alerts", get(handlers::history::list_alerts))
        .route("/api/sensors", get(handlers::history::list_sensors))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
