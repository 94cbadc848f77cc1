//! Sensor reading model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::{Alert, ListFilter};
use crate::logic::alerts::AlertThresholds;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SensorReading {
    pub id: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSensorReading {
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /add_sensor`. Absent and `null` fields both count as missing.
#[derive(Debug, Default, Deserialize)]
pub struct SensorPayload {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
}

impl SensorPayload {
    /// Names of the missing fields, in request order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("temperature", self.temperature.is_none()),
            ("humidity", self.humidity.is_none()),
            ("soil_moisture", self.soil_moisture.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }

    pub fn into_reading(self, timestamp: DateTime<Utc>) -> Result<NewSensorReading, Vec<&'static str>> {
        match (self.temperature, self.humidity, self.soil_moisture) {
            (Some(temperature), Some(humidity), Some(soil_moisture)) => Ok(NewSensorReading {
                temperature,
                humidity,
                soil_moisture,
                timestamp,
            }),
            _ => Err(self.missing_fields()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SensorResponse {
    pub message: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
}

impl SensorReading {
    /// Insert one reading row
    pub async fn append(conn: &mut SqliteConnection, data: &NewSensorReading) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SensorReading>(
            r#"
            INSERT INTO sensor_readings (temperature, humidity, soil_moisture, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(data.temperature)
        .bind(data.humidity)
        .bind(data.soil_moisture)
        .bind(data.timestamp)
        .fetch_one(&mut *conn)
        .await
    }

    /// Store a reading and its alert, if any rule fires, in one transaction
    pub async fn record(
        pool: &SqlitePool,
        data: NewSensorReading,
        thresholds: &AlertThresholds,
    ) -> Result<(Self, Option<Alert>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let reading = Self::append(&mut tx, &data).await?;

        let alert = match thresholds.evaluate(&data) {
            Some(pending) => Some(Alert::append(&mut tx, &pending, data.timestamp).await?),
            None => None,
        };

        tx.commit().await?;

        if let Some(alert) = &alert {
            tracing::warn!("{} ({}): {}", alert.alert_type, alert.severity, alert.message);
        }

        Ok((reading, alert))
    }

    /// Newest first
    pub async fn list(pool: &SqlitePool, filter: ListFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT * FROM sensor_readings
            ORDER BY timestamp DESC, id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(filter.limit())
        .bind(filter.offset())
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_missing_fields_in_request_order() {
        let payload = SensorPayload {
            humidity: Some(40.0),
            ..Default::default()
        };
        assert_eq!(payload.missing_fields(), ["temperature", "soil_moisture"]);
        assert_eq!(payload.into_reading(Utc::now()).unwrap_err(), ["temperature", "soil_moisture"]);
    }

    #[test]
    fn test_null_counts_as_missing() {
        let payload: SensorPayload =
            serde_json::from_str(r#"{"temperature": null, "humidity": 50, "soil_moisture": 40.5}"#).unwrap();
        assert_eq!(payload.missing_fields(), ["temperature"]);
    }

    #[tokio::test]
    async fn test_record_applies_rules() {
        let pool = db::create_pool("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let rules = AlertThresholds::default();

        let reading = |temperature, humidity, soil_moisture| NewSensorReading {
            temperature,
            humidity,
            soil_moisture,
            timestamp: Utc::now(),
        };

        let (_, alert) = SensorReading::record(&pool, reading(22.0, 50.0, 50.0), &rules).await.unwrap();
        assert!(alert.is_none());

        let (stored, alert) = SensorReading::record(&pool, reading(40.0, 50.0, 50.0), &rules).await.unwrap();
        assert_eq!(stored.temperature, 40.0);
        let alert = alert.unwrap();
        assert_eq!(alert.alert_type, "Temperature Alert");
        assert_eq!(alert.severity, "High");

        assert_eq!(SensorReading::list(&pool, ListFilter::default()).await.unwrap().len(), 2);
        assert_eq!(Alert::count(&pool).await.unwrap(), 1);
    }
}
