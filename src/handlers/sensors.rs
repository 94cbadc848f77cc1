//! Sensor submission handler

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use chrono::Utc;

use crate::models::{SensorPayload, SensorReading, SensorResponse};
use crate::{AppError, AppResult, AppState};

/// Store a sensor reading and raise at most one alert for it
pub async fn add_sensor(
    State(state): State<AppState>,
    payload: Result<Json<SensorPayload>, JsonRejection>,
) -> AppResult<Json<SensorResponse>> {
    let Json(payload) = payload?;

    let reading = payload.into_reading(Utc::now()).map_err(|missing| {
        AppError::ValidationError(format!("Missing sensor data: {}", missing.join(", ")))
    })?;

    let (stored, alert) =
        SensorReading::record(&state.pool, reading, &state.config.alert_thresholds).await?;

    tracing::debug!(
        "Sensor reading #{}: {:.1}C {:.1}% humidity {:.1}% soil",
        stored.id,
        stored.temperature,
        stored.humidity,
        stored.soil_moisture
    );

    Ok(Json(SensorResponse {
        message: "Sensor data stored successfully".to_string(),
        temperature: stored.temperature,
        humidity: stored.humidity,
        soil_moisture: stored.soil_moisture,
        alert,
    }))
}
