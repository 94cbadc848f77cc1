//! Alert Rule Engine
//!
//! Pure rules over detection and sensor events. Each event yields at most
//! one alert; persistence happens elsewhere.

use super::risk::RiskLevel;
use crate::models::NewSensorReading;

// ============================================================================
// TYPES
// ============================================================================

/// Alert severity as stored in the `alerts.severity` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which rule produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Pest,
    Temperature,
    Humidity,
    Moisture,
}

impl AlertKind {
    /// Value of the `alerts.alert_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Pest => "Pest Alert",
            AlertKind::Temperature => "Temperature Alert",
            AlertKind::Humidity => "Humidity Alert",
            AlertKind::Moisture => "Moisture Alert",
        }
    }
}

/// An alert decided by a rule but not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAlert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
}

/// Sensor thresholds. Readings beyond them raise an alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Temperature strictly above this is High severity
    pub temperature_max: f64,
    /// Humidity strictly above this is Medium severity
    pub humidity_max: f64,
    /// Soil moisture strictly below this is Medium severity
    pub soil_moisture_min: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temperature_max: 35.0,
            humidity_max: 80.0,
            soil_moisture_min: 30.0,
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Detection rule: only High risk raises an alert
pub fn detection_alert(pest_name: &str, risk_level: RiskLevel) -> Option<PendingAlert> {
    if risk_level != RiskLevel::High {
        return None;
    }

    Some(PendingAlert {
        kind: AlertKind::Pest,
        severity: Severity::High,
        message: format!("High risk pest detected: {}", pest_name),
    })
}

impl AlertThresholds {
    /// Sensor rules, first match wins: temperature, humidity, soil moisture.
    pub fn evaluate(&self, reading: &NewSensorReading) -> Option<PendingAlert> {
        if reading.temperature > self.temperature_max {
            Some(PendingAlert {
                kind: AlertKind::Temperature,
                severity: Severity::High,
                message: "High temperature detected".to_string(),
            })
        } else if reading.humidity > self.humidity_max {
            Some(PendingAlert {
                kind: AlertKind::Humidity,
                severity: Severity::Medium,
                message: "High humidity detected".to_string(),
            })
        } else if reading.soil_moisture < self.soil_moisture_min {
            Some(PendingAlert {
                kind: AlertKind::Moisture,
                severity: Severity::Medium,
                message: "Low soil moisture detected".to_string(),
            })
        } else {
            None
        }
    }
}
