//! Engine configuration
//!
//! Every tunable threshold and the population reference values used by the
//! comparison-to-norm bars live here. Configuration is supplied by the caller
//! (usually as JSON) and is never read from the environment by the library.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::Symptom;

/// Default relative change that flips a trend from stable to up/down
pub const DEFAULT_TREND_THRESHOLD: f64 = 0.15;

/// Default minimum number of points before a trend is attempted (two per half)
pub const DEFAULT_TREND_MIN_POINTS: usize = 4;

/// Default cap on the number of insights returned
pub const DEFAULT_MAX_INSIGHTS: usize = 3;

/// Default number of ranked symptoms surfaced to the insight rules
pub const DEFAULT_TOP_SYMPTOMS: usize = 3;

/// Default window count at which a symptom becomes a pattern insight
pub const DEFAULT_SYMPTOM_COUNT_THRESHOLD: u32 = 3;

/// Default minimum observations before a category share is commented on
pub const DEFAULT_MIN_CATEGORY_SAMPLES: u32 = 3;

/// Trend detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Relative change between halves that counts as movement (0.15 = 15%)
    pub threshold: f64,
    /// Fewer values than this yield `stable`
    pub min_points: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_TREND_THRESHOLD,
            min_points: DEFAULT_TREND_MIN_POINTS,
        }
    }
}

/// Population reference values, in percent of people affected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormTable {
    /// Share of people reporting each symptom
    pub symptoms: BTreeMap<Symptom, f64>,
}

impl Default for NormTable {
    fn default() -> Self {
        let mut symptoms = BTreeMap::new();
        symptoms.insert(Symptom::HotFlashes, 75.0);
        symptoms.insert(Symptom::SleepIssues, 60.0);
        symptoms.insert(Symptom::NightSweats, 40.0);
        Self { symptoms }
    }
}

impl NormTable {
    pub fn symptom(&self, symptom: Symptom) -> Option<f64> {
        self.symptoms.get(&symptom).copied()
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// First day of a calendar week for the `week` window
    pub week_start: Weekday,
    pub trend: TrendConfig,
    pub max_insights: usize,
    pub top_symptoms: usize,
    pub symptom_count_threshold: u32,
    pub min_category_samples: u32,
    pub norms: NormTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            trend: TrendConfig::default(),
            max_insights: DEFAULT_MAX_INSIGHTS,
            top_symptoms: DEFAULT_TOP_SYMPTOMS,
            symptom_count_threshold: DEFAULT_SYMPTOM_COUNT_THRESHOLD,
            min_category_samples: DEFAULT_MIN_CATEGORY_SAMPLES,
            norms: NormTable::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from JSON; missing keys fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.trend.threshold.is_finite() || self.trend.threshold <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "trend.threshold must be a positive number, got {}",
                self.trend.threshold
            )));
        }
        if self.trend.min_points < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "trend.min_points must be at least 2, got {}",
                self.trend.min_points
            )));
        }
        if self.max_insights == 0 {
            return Err(EngineError::InvalidConfig(
                "max_insights must be at least 1".to_string(),
            ));
        }

        for (symptom, value) in &self.norms.symptoms {
            if !value.is_finite() || *value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "norm for {} must be a non-negative number, got {}",
                    symptom.as_str(),
                    value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.week_start, Weekday::Sun);
        assert_eq!(config.norms.symptom(Symptom::HotFlashes), Some(75.0));
        assert_eq!(config.norms.symptom(Symptom::Bloating), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "week_start": "Mon", "trend": { "threshold": 0.25 } }"#,
        )
        .unwrap();

        assert_eq!(config.week_start, Weekday::Mon);
        assert_eq!(config.trend.threshold, 0.25);
        assert_eq!(config.trend.min_points, DEFAULT_TREND_MIN_POINTS);
        assert_eq!(config.max_insights, DEFAULT_MAX_INSIGHTS);
    }

    #[test]
    fn test_norms_from_json() {
        let config = EngineConfig::from_json(
            r#"{ "norms": { "symptoms": { "pain": 35.0 } } }"#,
        )
        .unwrap();

        assert_eq!(config.norms.symptom(Symptom::Pain), Some(35.0));
        assert_eq!(config.norms.symptom(Symptom::HotFlashes), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(EngineConfig::from_json(r#"{ "trend": { "threshold": 0.0 } }"#).is_err());
        assert!(EngineConfig::from_json(r#"{ "trend": { "min_points": 1 } }"#).is_err());
        assert!(EngineConfig::from_json(r#"{ "max_insights": 0 }"#).is_err());
        assert!(
            EngineConfig::from_json(r#"{ "norms": { "symptoms": { "pain": -3.0 } } }"#).is_err()
        );
    }

    #[test]
    fn test_round_trip_json() {
        let config = EngineConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
