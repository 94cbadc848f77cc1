//! Alert model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::ListFilter;
use crate::logic::alerts::PendingAlert;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: i64,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Insert one alert row
    pub async fn append(
        conn: &mut SqliteConnection,
        alert: &PendingAlert,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (alert_type, severity, message, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(alert.kind.as_str())
        .bind(alert.severity.as_str())
        .bind(&alert.message)
        .bind(timestamp)
        .fetch_one(&mut *conn)
        .await
    }

    /// Newest first
    pub async fn list(pool: &SqlitePool, filter: ListFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts
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
        sqlx::query_scalar("SELECT COUNT(*) FROM alerts")
            .fetch_one(pool)
            .await
    }
}
