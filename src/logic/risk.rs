//! Risk Classifier
//!
//! Maps a detection confidence (percent) to a qualitative risk tier.

/// Confidence strictly above this is High
pub const HIGH_RISK_ABOVE: f64 = 80.0;

/// Confidence strictly above this (and not High) is Medium
pub const MEDIUM_RISK_ABOVE: f64 = 50.0;

/// Risk tiers, ordered Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify a confidence in percent.
    ///
    /// Both boundaries are exclusive: exactly 80 is Medium, exactly 50 is Low.
    /// NaN falls through to Low.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > HIGH_RISK_ABOVE {
            RiskLevel::High
        } else if confidence > MEDIUM_RISK_ABOVE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(RiskLevel::from_confidence(99.5), RiskLevel::High);
        assert_eq!(RiskLevel::from_confidence(65.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_confidence(12.0), RiskLevel::Low);
    }

    #[test]
    fn test_boundaries_fall_to_lower_tier() {
        assert_eq!(RiskLevel::from_confidence(80.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_confidence(80.01), RiskLevel::High);
        assert_eq!(RiskLevel::from_confidence(50.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_confidence(50.01), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_confidence(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_confidence(100.0), RiskLevel::High);
    }

    #[test]
    fn test_matches_definition_over_range() {
        for step in 0..=10_000 {
            let c = step as f64 / 100.0;
            let expected = if c > 80.0 {
                RiskLevel::High
            } else if c > 50.0 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            };
            assert_eq!(RiskLevel::from_confidence(c), expected, "confidence {}", c);
        }
    }

    #[test]
    fn test_monotonic() {
        let mut previous = RiskLevel::Low;
        for step in 0..=10_000 {
            let level = RiskLevel::from_confidence(step as f64 / 100.0);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_display_matches_column_values() {
        assert_eq!(RiskLevel::Low.to_string(), "Low");
        assert_eq!(RiskLevel::Medium.to_string(), "Medium");
        assert_eq!(RiskLevel::High.as_str(), "High");
    }
}
