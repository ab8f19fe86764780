//! Cycle observations
//!
//! Consecutive period days form an episode; a cycle is the distance between
//! two episode starts. Regularity and the recent cycle trend are derived from
//! those lengths.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::metrics::CategorySummary;
use crate::types::{BleedingIntensity, CycleEntry};

/// Cycle lengths in this range (days) count as regular
pub const REGULAR_CYCLE_DAYS: RangeInclusive<i64> = 21..=35;

/// Coefficient of variation above which cycles are irregular
pub const IRREGULAR_VARIATION: f64 = 0.3;

/// Change between consecutive cycles that counts as shortening or lengthening
pub const CYCLE_SHIFT_DAYS: i64 = 3;

/// Change between consecutive cycles that counts as irregular
pub const CYCLE_JUMP_DAYS: i64 = 7;

/// Number of cycle symptom tags reported
const TOP_TAGS: usize = 3;

/// Direction of the last three cycle lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTrend {
    Shortening,
    Lengthening,
    Irregular,
    Stable,
}

/// A run of consecutive period days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEpisode {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

/// Cycle statistics over a set of cycle entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleSummary {
    NoData,
    Observed(CycleStats),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub period_days: u32,
    pub episodes: Vec<PeriodEpisode>,
    /// Days between consecutive episode starts
    pub cycle_lengths: Vec<i64>,
    pub average_length: Option<f64>,
    /// Standard deviation over mean of the cycle lengths
    pub variation: Option<f64>,
    /// `None` until at least one full cycle is known
    pub regular: Option<bool>,
    pub trend: CycleTrend,
    pub bleeding: CategorySummary<BleedingIntensity>,
    pub top_symptoms: Vec<TagCount>,
}

impl CycleSummary {
    pub fn is_no_data(&self) -> bool {
        matches!(self, CycleSummary::NoData)
    }

    pub fn stats(&self) -> Option<&CycleStats> {
        match self {
            CycleSummary::NoData => None,
            CycleSummary::Observed(stats) => Some(stats),
        }
    }
}

impl CycleStats {
    pub fn is_irregular(&self) -> bool {
        self.trend == CycleTrend::Irregular || self.regular == Some(false)
    }
}

/// Summarize cycle entries; `NoData` when there are none
pub fn cycle_summary(entries: &[CycleEntry]) -> CycleSummary {
    if entries.is_empty() {
        return CycleSummary::NoData;
    }

    let episodes = period_episodes(entries);
    let cycle_lengths: Vec<i64> = episodes
        .windows(2)
        .map(|pair| (pair[1].start - pair[0].start).num_days())
        .collect();

    let average_length = mean(&cycle_lengths);
    let variation = coefficient_of_variation(&cycle_lengths);
    let regular = if cycle_lengths.is_empty() {
        None
    } else {
        let in_range = cycle_lengths.iter().all(|l| REGULAR_CYCLE_DAYS.contains(l));
        Some(in_range && variation.map_or(true, |cv| cv <= IRREGULAR_VARIATION))
    };

    CycleSummary::Observed(CycleStats {
        period_days: episodes.iter().map(|e| e.days).sum(),
        trend: cycle_trend(&cycle_lengths),
        episodes,
        cycle_lengths,
        average_length,
        variation,
        regular,
        bleeding: CategorySummary::from_values(
            entries
                .iter()
                .filter(|e| e.is_period)
                .filter_map(|e| e.bleeding_intensity),
        ),
        top_symptoms: top_tags(entries),
    })
}

/// Group period days into runs of consecutive dates, oldest first
pub fn period_episodes(entries: &[CycleEntry]) -> Vec<PeriodEpisode> {
    let mut days: Vec<NaiveDate> = entries.iter().filter(|e| e.is_period).map(|e| e.date).collect();
    days.sort();
    days.dedup();

    let mut episodes: Vec<PeriodEpisode> = Vec::new();
    for day in days {
        match episodes.last_mut() {
            Some(current) if day - current.end == Duration::days(1) => {
                current.end = day;
                current.days += 1;
            }
            _ => episodes.push(PeriodEpisode {
                start: day,
                end: day,
                days: 1,
            }),
        }
    }
    episodes
}

/// Trend over the last three cycle lengths; `Stable` with fewer than three
pub fn cycle_trend(lengths: &[i64]) -> CycleTrend {
    if lengths.len() < 3 {
        return CycleTrend::Stable;
    }
    let recent = &lengths[lengths.len() - 3..];
    let first = recent[1] - recent[0];
    let second = recent[2] - recent[1];

    if first < -CYCLE_SHIFT_DAYS && second < -CYCLE_SHIFT_DAYS {
        CycleTrend::Shortening
    } else if first > CYCLE_SHIFT_DAYS && second > CYCLE_SHIFT_DAYS {
        CycleTrend::Lengthening
    } else if first.abs() > CYCLE_JUMP_DAYS || second.abs() > CYCLE_JUMP_DAYS {
        CycleTrend::Irregular
    } else {
        CycleTrend::Stable
    }
}

fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
}

// Sample standard deviation over the mean; needs two cycles
fn coefficient_of_variation(values: &[i64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    if mean <= 0.0 {
        return None;
    }
    let variance = values
        .iter()
        .map(|v| (*v as f64 - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt() / mean)
}

fn top_tags(entries: &[CycleEntry]) -> Vec<TagCount> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for tag in entries.iter().flat_map(|e| e.symptoms.iter()) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    // BTreeMap order keeps equal counts alphabetical
    tags.sort_by(|a, b| b.count.cmp(&a.count));
    tags.truncate(TOP_TAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn period(m: u32, d: u32, intensity: Option<BleedingIntensity>) -> CycleEntry {
        let mut entry = CycleEntry::new(date(m, d), true);
        entry.bleeding_intensity = intensity;
        entry
    }

    /// A period of `days` starting on each given date
    fn periods(starts: &[(u32, u32)], days: i64) -> Vec<CycleEntry> {
        starts
            .iter()
            .flat_map(|(m, d)| {
                (0..days).map(move |offset| {
                    CycleEntry::new(date(*m, *d) + Duration::days(offset), true)
                })
            })
            .collect()
    }

    #[test]
    fn test_no_entries_is_no_data() {
        assert!(cycle_summary(&[]).is_no_data());
    }

    #[test]
    fn test_episodes_merge_consecutive_days() {
        let mut entries = periods(&[(1, 1), (1, 29)], 4);
        entries.push(CycleEntry::new(date(1, 10), false));
        entries.reverse();

        let episodes = period_episodes(&entries);
        assert_eq!(
            episodes,
            vec![
                PeriodEpisode {
                    start: date(1, 1),
                    end: date(1, 4),
                    days: 4
                },
                PeriodEpisode {
                    start: date(1, 29),
                    end: date(2, 1),
                    days: 4
                },
            ]
        );
    }

    #[test]
    fn test_regular_cycles() {
        let entries = periods(&[(1, 1), (1, 29), (2, 26), (3, 26)], 3);
        let summary = cycle_summary(&entries);
        let stats = summary.stats().unwrap();

        assert_eq!(stats.cycle_lengths, vec![28, 28, 29]);
        assert_eq!(stats.period_days, 12);
        assert_eq!(stats.regular, Some(true));
        assert_eq!(stats.trend, CycleTrend::Stable);
        assert!(!stats.is_irregular());
        assert!((stats.average_length.unwrap() - 85.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_cycle_is_irregular() {
        let entries = periods(&[(1, 1), (1, 29), (3, 20)], 2);
        let summary = cycle_summary(&entries);
        let stats = summary.stats().unwrap();

        assert_eq!(stats.cycle_lengths, vec![28, 51]);
        assert_eq!(stats.regular, Some(false));
        assert!(stats.is_irregular());
    }

    #[test]
    fn test_single_episode_has_unknown_regularity() {
        let summary = cycle_summary(&periods(&[(1, 1)], 5));
        let stats = summary.stats().unwrap();
        assert_eq!(stats.regular, None);
        assert_eq!(stats.average_length, None);
        assert_eq!(stats.variation, None);
    }

    #[test]
    fn test_cycle_trend() {
        assert_eq!(cycle_trend(&[28, 30]), CycleTrend::Stable);
        assert_eq!(cycle_trend(&[35, 30, 25]), CycleTrend::Shortening);
        assert_eq!(cycle_trend(&[40, 24, 28, 33]), CycleTrend::Lengthening);
        assert_eq!(cycle_trend(&[28, 37, 35]), CycleTrend::Irregular);
        assert_eq!(cycle_trend(&[28, 31, 29]), CycleTrend::Stable);
    }

    #[test]
    fn test_bleeding_and_tags() {
        let mut cramps = period(1, 1, Some(BleedingIntensity::Heavy));
        cramps.symptoms.insert("cramps".to_string());
        cramps.symptoms.insert("fatigue".to_string());
        let mut second = period(1, 2, Some(BleedingIntensity::Medium));
        second.symptoms.insert("cramps".to_string());
        let mut spotting = CycleEntry::new(date(1, 20), false);
        spotting.symptoms.insert("acne".to_string());
        let entries = vec![
            cramps,
            second,
            period(1, 3, Some(BleedingIntensity::Medium)),
            spotting,
        ];

        let summary = cycle_summary(&entries);
        let stats = summary.stats().unwrap();
        assert_eq!(stats.bleeding.most_common(), Some(BleedingIntensity::Medium));
        assert_eq!(stats.bleeding.total(), 3);
        assert_eq!(
            stats.top_symptoms,
            vec![
                TagCount {
                    tag: "cramps".to_string(),
                    count: 2
                },
                TagCount {
                    tag: "acne".to_string(),
                    count: 1
                },
                TagCount {
                    tag: "fatigue".to_string(),
                    count: 1
                },
            ]
        );
    }
}
