//! History handlers, newest first

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::models::{Alert, Detection, ListFilter, SensorReading};
use crate::{AppResult, AppState};

pub async fn list_pests(
    State(state): State<AppState>,
    filter: Result<Query<ListFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Detection>>> {
    let Query(filter) = filter?;
    let detections = Detection::list(&state.pool, filter).await?;
    Ok(Json(detections))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    filter: Result<Query<ListFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Alert>>> {
    let Query(filter) = filter?;
    let alerts = Alert::list(&state.pool, filter).await?;
    Ok(Json(alerts))
}

pub async fn list_sensors(
    State(state): State<AppState>,
    filter: Result<Query<ListFilter>, QueryRejection>,
) -> AppResult<Json<Vec<SensorReading>>> {
    let Query(filter) = filter?;
    let readings = SensorReading::list(&state.pool, filter).await?;
    Ok(Json(readings))
}
