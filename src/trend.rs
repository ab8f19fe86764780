//! Trend detection
//!
//! A trend compares the earlier half of a chronologically ordered series with
//! the later half. With an odd number of points the extra one goes to the later
//! half, so both halves are reduced to a per-point rate before comparing. The
//! relative change between the two half aggregates is compared against
//! [`TrendConfig::threshold`].
//!
//! Series are built per calendar day from the days that have entries; days
//! without entries are not filled in.

use serde::{Deserialize, Serialize};

use crate::config::TrendConfig;
use crate::types::{Category, DailyEntry, Mood, Symptom};
use crate::window::bucket_by_day;

/// Direction label for a metric series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

/// How each half of a series is reduced to one number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Count-like metrics (symptom occurrences), compared as the count per
    /// logged day so halves of unequal length stay comparable
    Sum,
    /// Score-like metrics (sleep, mood, energy)
    Mean,
}

impl Aggregate {
    fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let sum: f64 = values.iter().sum();
        match self {
            // Counts are compared as a rate per point
            Aggregate::Sum | Aggregate::Mean => sum / values.len() as f64,
        }
    }
}

/// Label the direction of an ordered series.
///
/// Series shorter than `config.min_points` (never fewer than 2) are `Stable`.
pub fn detect_trend(values: &[f64], aggregate: Aggregate, config: &TrendConfig) -> Trend {
    if values.len() < config.min_points.max(2) {
        return Trend::Stable;
    }

    let (earlier, later) = values.split_at(values.len() / 2);
    let earlier = aggregate.apply(earlier);
    let later = aggregate.apply(later);

    if earlier.abs() < f64::EPSILON {
        return if later > 0.0 { Trend::Up } else { Trend::Stable };
    }

    let change = (later - earlier) / earlier.abs();
    if change > config.threshold {
        Trend::Up
    } else if change < -config.threshold {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Number of entries flagging `symptom`, per logged day
pub fn symptom_series(entries: &[DailyEntry], symptom: Symptom) -> Vec<f64> {
    bucket_by_day(entries)
        .values()
        .map(|day| day.iter().filter(|e| e.has_symptom(symptom)).count() as f64)
        .collect()
}

/// Mean morning sleep score per day (poor 1, fair 2, good 3)
pub fn sleep_series(entries: &[DailyEntry]) -> Vec<f64> {
    daily_means(entries, |e| e.morning_sleep_quality().map(|q| q.score()))
}

/// Share of positive moods per day, 0.0 to 1.0
pub fn mood_series(entries: &[DailyEntry]) -> Vec<f64> {
    daily_means(entries, |e| {
        e.mood
            .map(|m: Mood| if m.is_positive() { 1.0 } else { 0.0 })
    })
}

/// Mean energy score per day (low 1, medium 2, high 3)
pub fn energy_series(entries: &[DailyEntry]) -> Vec<f64> {
    daily_means(entries, |e| e.energy_level.map(|l| l.score()))
}

// Days where no entry yields a value are skipped
fn daily_means<F>(entries: &[DailyEntry], value: F) -> Vec<f64>
where
    F: Fn(&DailyEntry) -> Option<f64>,
{
    bucket_by_day(entries)
        .values()
        .filter_map(|day| {
            let values: Vec<f64> = day.iter().filter_map(|e| value(*e)).collect();
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        })
        .collect()
}

/// Trend labels reported for a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub sleep: Trend,
    pub mood: Trend,
    pub energy: Trend,
    /// Trend of the top ranked symptom, if any symptom was flagged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_symptom: Option<SymptomTrend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymptomTrend {
    pub symptom: Symptom,
    pub trend: Trend,
}

impl TrendSummary {
    pub fn compute(
        entries: &[DailyEntry],
        top_symptom: Option<Symptom>,
        config: &TrendConfig,
    ) -> Self {
        Self {
            sleep: detect_trend(&sleep_series(entries), Aggregate::Mean, config),
            mood: detect_trend(&mood_series(entries), Aggregate::Mean, config),
            energy: detect_trend(&energy_series(entries), Aggregate::Mean, config),
            top_symptom: top_symptom.map(|symptom| SymptomTrend {
                symptom,
                trend: detect_trend(&symptom_series(entries, symptom), Aggregate::Sum, config),
            }),
        }
    }
}
