//! Raw journal rows as they come out of storage
//!
//! Dates, categories and times of day are plain strings here; booleans may be
//! null. Nothing is interpreted until [`super::JournalAdapter`] converts the
//! rows into the typed entry model.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::TimeOfDay;

/// One daily entry row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDailyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub date: String,
    pub time_of_day: String,
    #[serde(default)]
    pub sleep_quality: Option<String>,
    #[serde(default)]
    pub woke_up_night: Option<bool>,
    #[serde(default)]
    pub night_sweats: Option<bool>,
    #[serde(default)]
    pub energy_level: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub hot_flashes: Option<bool>,
    #[serde(default)]
    pub dryness: Option<bool>,
    #[serde(default)]
    pub pain: Option<bool>,
    #[serde(default)]
    pub bloating: Option<bool>,
    #[serde(default)]
    pub concentration_difficulty: Option<bool>,
    #[serde(default)]
    pub sleep_issues: Option<bool>,
    #[serde(default)]
    pub sexual_desire: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawDailyEntry {
    /// Check the fields a typed entry cannot exist without
    pub fn validate(&self) -> Result<(NaiveDate, TimeOfDay), ValidationError> {
        let date = parse_entry_date(&self.date)?;
        let time_of_day = TimeOfDay::parse(&self.time_of_day)
            .ok_or_else(|| ValidationError::InvalidTimeOfDay(self.time_of_day.clone()))?;
        Ok((date, time_of_day))
    }
}

/// One cycle entry row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCycleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub date: String,
    #[serde(default)]
    pub is_period: Option<bool>,
    #[serde(default)]
    pub bleeding_intensity: Option<String>,
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawCycleEntry {
    pub fn validate(&self) -> Result<NaiveDate, ValidationError> {
        parse_entry_date(&self.date)
    }
}

/// One element of a row array: a readable row, or the raw JSON of a row whose
/// fields have the wrong types (a null date, `"yes"` for a flag)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRow<T> {
    Row(T),
    Malformed(serde_json::Value),
}

impl<T: DeserializeOwned> RawRow<T> {
    /// The readable row, or why it could not be read
    pub fn row(&self) -> Result<&T, ValidationError> {
        match self {
            RawRow::Row(row) => Ok(row),
            RawRow::Malformed(value) => {
                let reason = serde_json::from_value::<T>(value.clone())
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unreadable row".to_string());
                Err(ValidationError::Malformed(reason))
            }
        }
    }
}

impl<T> From<T> for RawRow<T> {
    fn from(row: T) -> Self {
        RawRow::Row(row)
    }
}

/// A full journal export for one user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawJournal {
    #[serde(default)]
    pub daily_entries: Vec<RawRow<RawDailyEntry>>,
    #[serde(default)]
    pub cycle_entries: Vec<RawRow<RawCycleEntry>>,
}

/// Resolve a stored date to its nominal local calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM[:SS]`
/// timestamps. Timestamps keep the calendar date they were written with; an
/// offset is never used to shift the day.
pub fn parse_entry_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(timestamp.date());
        }
    }

    Err(ValidationError::InvalidDate(value.to_string()))
}

/// Validation errors for raw rows
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Invalid time of day: {0:?} (expected morning or evening)")]
    InvalidTimeOfDay(String),

    #[error("Malformed row: {0}")]
    Malformed(String),
}
