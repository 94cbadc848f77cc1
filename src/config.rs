//! Configuration module

use std::env;
use std::str::FromStr;

use crate::logic::alerts::AlertThresholds;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server port
    pub port: u16,

    /// Frozen classifier artifact (ONNX)
    pub model_path: String,

    /// Label file aligned with the classifier's output units
    pub labels_path: String,

    /// Maximum accepted request body, in bytes
    pub max_upload_bytes: usize,

    /// Sensor alert thresholds
    pub alert_thresholds: AlertThresholds,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://pest_system.db".to_string(),
            port: 5000,
            model_path: "pest_cnn_model.onnx".to_string(),
            labels_path: "classes.txt".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            alert_thresholds: AlertThresholds::default(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),

            port: parse_var("PORT").unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH").unwrap_or(defaults.model_path),

            labels_path: env::var("LABELS_PATH").unwrap_or(defaults.labels_path),

            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),

            alert_thresholds: AlertThresholds {
                temperature_max: parse_var("ALERT_TEMPERATURE_MAX")
                    .unwrap_or(defaults.alert_thresholds.temperature_max),
                humidity_max: parse_var("ALERT_HUMIDITY_MAX")
                    .unwrap_or(defaults.alert_thresholds.humidity_max),
                soil_moisture_min: parse_var("ALERT_SOIL_MOISTURE_MIN")
                    .unwrap_or(defaults.alert_thresholds.soil_moisture_min),
            },

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }
}

/// Read and parse a variable, ignoring unset or unparsable values
fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}
