//! Windowed aggregation
//!
//! Filters an entry collection to a time window ending at the reference date
//! and buckets the survivors by calendar day.
//!
//! - `week` starts at the most recent configured week-start weekday
//! - `day`, `month` and `quarter` are trailing 1, 30 and 90 calendar days,
//!   counting the reference date itself
//! - entries dated after the reference date are always excluded

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::EngineError;
use crate::types::Dated;

/// Aggregation window selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Day,
    Week,
    Month,
    Quarter,
}

impl Window {
    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Day => "day",
            Window::Week => "week",
            Window::Month => "month",
            Window::Quarter => "quarter",
        }
    }

    /// Length of a trailing window in days; `None` for calendar weeks
    pub fn trailing_days(&self) -> Option<i64> {
        match self {
            Window::Day => Some(1),
            Window::Week => None,
            Window::Month => Some(30),
            Window::Quarter => Some(90),
        }
    }

    /// Inclusive date range covered by this window
    pub fn bounds(&self, today: NaiveDate, week_start: Weekday) -> WindowBounds {
        let start = match self.trailing_days() {
            Some(days) => today - Duration::days(days - 1),
            None => start_of_week(today, week_start),
        };
        WindowBounds { start, end: today }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Window::Day),
            "week" => Ok(Window::Week),
            "month" => Ok(Window::Month),
            "quarter" | "three_months" => Ok(Window::Quarter),
            other => Err(EngineError::InvalidWindow(other.to_string())),
        }
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WindowBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Most recent `week_start` on or before `today`
pub fn start_of_week(today: NaiveDate, week_start: Weekday) -> NaiveDate {
    let days_back = (7 + today.weekday().num_days_from_monday()
        - week_start.num_days_from_monday())
        % 7;
    today - Duration::days(i64::from(days_back))
}

/// Keep the entries that fall inside `window`, leaving the input untouched
pub fn filter_window<T: Dated + Clone>(
    entries: &[T],
    window: Window,
    today: NaiveDate,
    week_start: Weekday,
) -> Vec<T> {
    let bounds = window.bounds(today, week_start);
    trace!(window = %window, start = %bounds.start, end = %bounds.end, "Filtering window");

    entries
        .iter()
        .filter(|entry| bounds.contains(entry.date()))
        .cloned()
        .collect()
}

/// Group entries by calendar day, in chronological order
pub fn bucket_by_day<T: Dated>(entries: &[T]) -> BTreeMap<NaiveDate, Vec<&T>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&T>> = BTreeMap::new();
    for entry in entries {
        buckets.entry(entry.date()).or_default().push(entry);
    }
    buckets
}
