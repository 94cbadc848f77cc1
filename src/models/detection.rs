//! Pest detection model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::{Alert, ListFilter};
use crate::logic::alerts;
use crate::logic::model::Prediction;
use crate::logic::risk::RiskLevel;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Detection {
    pub id: i64,
    pub pest_name: String,
    pub confidence: f64,
    pub risk_level: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDetection {
    pub pest_name: String,
    /// Percent, rounded to 2 decimals
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub timestamp: DateTime<Utc>,
}

impl NewDetection {
    /// Risk is derived from the unrounded confidence
    pub fn from_prediction(prediction: &Prediction, timestamp: DateTime<Utc>) -> Self {
        Self {
            pest_name: prediction.pest_name.clone(),
            confidence: round2(prediction.confidence),
            risk_level: RiskLevel::from_confidence(prediction.confidence),
            timestamp,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Detection {
    /// Insert one detection row
    pub async fn append(conn: &mut SqliteConnection, data: &NewDetection) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Detection>(
            r#"
            INSERT INTO pest_detections (pest_name, confidence, risk_level, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(&data.pest_name)
        .bind(data.confidence)
        .bind(data.risk_level.as_str())
        .bind(data.timestamp)
        .fetch_one(&mut *conn)
        .await
    }

    /// Store a detection and, for High risk, its alert in one transaction
    pub async fn record(
        pool: &SqlitePool,
        data: NewDetection,
    ) -> Result<(Self, Option<Alert>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let detection = Self::append(&mut tx, &data).await?;

        let alert = match alerts::detection_alert(&data.pest_name, data.risk_level) {
            Some(pending) => Some(Alert::append(&mut tx, &pending, data.timestamp).await?),
            None => None,
        };

        tx.commit().await?;

        if let Some(alert) = &alert {
            tracing::warn!("{}: {}", alert.alert_type, alert.message);
        }

        Ok((detection, alert))
    }

    /// Newest first
    pub async fn list(pool: &SqlitePool, filter: ListFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Detection>(
            r#"
            SELECT * FROM pest_detections
            ORDER BY timestamp DESC, id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(filter.limit())
        .bind(filter.offset())
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM pest_detections")
            .fetch_one(pool)
            .await
    }
}
