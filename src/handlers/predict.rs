//! Image prediction handler

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::models::{Detection, NewDetection};
use crate::{AppError, AppResult, AppState};

/// Multipart field carrying the leaf image
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub pest_name: String,
    pub confidence: f64,
    pub risk_level: String,
}

/// Classify an uploaded leaf image and record the detection
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PredictResponse>> {
    let mut multipart = multipart?;
    let image = read_image_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::ValidationError("No image uploaded".to_string()))?;

    let model = state
        .model
        .ready()
        .map(Arc::clone)
        .map_err(|reason| AppError::ModelUnavailable(reason.to_string()))?;

    // CPU bound, keep it off the async workers
    let prediction = tokio::task::spawn_blocking(move || model.predict(&image)).await??;

    let (detection, alert) =
        Detection::record(&state.pool, NewDetection::from_prediction(&prediction, Utc::now())).await?;

    tracing::info!(
        "Detection #{}: {} {:.2}% ({}){}",
        detection.id,
        detection.pest_name,
        detection.confidence,
        detection.risk_level,
        if alert.is_some() { ", alert raised" } else { "" }
    );

    Ok(Json(PredictResponse {
        pest_name: detection.pest_name,
        confidence: detection.confidence,
        risk_level: detection.risk_level,
    }))
}

/// First non-empty `image` field, if any
async fn read_image_field(multipart: &mut Multipart) -> AppResult<Option<Bytes>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let bytes = field.bytes().await?;
        if !bytes.is_empty() {
            return Ok(Some(bytes));
        }
    }

    Ok(None)
}
