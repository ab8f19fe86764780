//! Pipeline orchestration
//!
//! This module provides the public API of the engine. It runs the full
//! derivation for one user snapshot, one window and one reference date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::cycle::{cycle_summary, CycleSummary};
use crate::error::{EngineError, Result};
use crate::insights::{InsightGenerator, InsightReport, Metrics};
use crate::metrics::{
    energy_summary, hot_flash_sleep_overlap, mood_summary, sleep_summary, symptom_summary,
    wellness_score, CategorySummary, SymptomSummary,
};
use crate::ranker::{rank_symptoms, RankedSymptom};
use crate::schema::JournalAdapter;
use crate::streak::{current_streak, longest_streak};
use crate::trend::TrendSummary;
use crate::types::{
    CycleEntry, DailyEntry, EnergyLevel, EntrySet, Mood, SkippedEntry, SleepQuality,
};
use crate::window::{filter_window, Window};

/// Everything derived for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub window: Window,
    pub today: NaiveDate,
    pub window_start: NaiveDate,
    /// Daily entries inside the window
    pub entries_in_window: u32,
    /// Rows dropped while building the snapshot
    pub skipped_entries: Vec<SkippedEntry>,
    pub streak: u32,
    pub longest_streak: u32,
    pub sleep: CategorySummary<SleepQuality>,
    pub mood: CategorySummary<Mood>,
    pub energy: CategorySummary<EnergyLevel>,
    pub symptoms: SymptomSummary,
    pub ranked_symptoms: Vec<RankedSymptom>,
    pub trends: TrendSummary,
    /// Computed over the whole cycle history up to the reference date
    pub cycle: CycleSummary,
    pub wellness_score: Option<f64>,
    pub insights: InsightReport,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a `YYYY-MM-DD` reference date
pub fn parse_reference_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::DateParseError(format!("{value}: {e}")))
}

/// Analyze a raw journal JSON document with the default configuration.
///
/// # Example
/// ```ignore
/// let report_json = analyze_journal_json(journal_json, "week", "2025-01-16")?;
/// ```
pub fn analyze_journal_json(journal_json: &str, window: &str, today: &str) -> Result<String> {
    let window: Window = window.parse()?;
    let today = parse_reference_date(today)?;
    InsightEngine::new().analyze_json(journal_json, window, today)
}

/// The derivation engine.
///
/// Holds only configuration; every call works on the snapshot it is given, so
/// one engine can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: EngineConfig,
}

impl InsightEngine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a specific configuration
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full derivation.
    ///
    /// Stages:
    /// 1. Window filter over daily entries
    /// 2. Streaks over the full daily history
    /// 3. Metric extractors, symptom ranking and cycle statistics
    /// 4. Trend detection
    /// 5. Insight generation and ranking
    pub fn analyze(&self, entries: &EntrySet, window: Window, today: NaiveDate) -> AnalysisReport {
        let week_start = self.config.week_start;
        let bounds = window.bounds(today, week_start);

        // Stage 1: window
        let in_window: Vec<DailyEntry> = filter_window(&entries.daily, window, today, week_start);

        // Stage 2: streaks, never counting future-dated entries
        let history: Vec<&DailyEntry> = entries.daily.iter().filter(|e| e.date <= today).collect();
        let streak = current_streak(&history, today);
        let longest = longest_streak(&history);

        // Stage 3: extractors
        let sleep = sleep_summary(&in_window);
        let mood = mood_summary(&in_window);
        let energy = energy_summary(&in_window);
        let symptoms = symptom_summary(&in_window);
        let ranked_symptoms = rank_symptoms(&in_window);
        let cycle_history: Vec<CycleEntry> = entries
            .cycle
            .iter()
            .filter(|e| e.date <= today)
            .cloned()
            .collect();
        let cycle = cycle_summary(&cycle_history);
        let wellness = wellness_score(&sleep, &energy, &mood);

        // Stage 4: trends
        let trends = TrendSummary::compute(
            &in_window,
            ranked_symptoms.first().map(|r| r.symptom),
            &self.config.trend,
        );

        // Stage 5: insights
        let metrics = Metrics {
            window,
            today,
            new_user: entries.is_empty(),
            streak,
            entries_in_window: in_window.len() as u32,
            sleep: &sleep,
            mood: &mood,
            energy: &energy,
            symptoms: &symptoms,
            ranked_symptoms: &ranked_symptoms,
            hot_flash_sleep_overlap: hot_flash_sleep_overlap(&in_window),
            trends: &trends,
            cycle: &cycle,
        };
        let insights = InsightGenerator::new(&self.config).report(&metrics);

        debug!(
            window = %window,
            %today,
            entries = in_window.len(),
            streak,
            insights = insights.insights.len(),
            "Analysis complete"
        );

        AnalysisReport {
            window,
            today,
            window_start: bounds.start,
            entries_in_window: in_window.len() as u32,
            skipped_entries: entries.skipped.clone(),
            streak,
            longest_streak: longest,
            sleep,
            mood,
            energy,
            symptoms,
            ranked_symptoms,
            trends,
            cycle,
            wellness_score: wellness,
            insights,
        }
    }

    /// Parse a raw journal JSON document, analyze it and return the report as JSON
    pub fn analyze_json(&self, journal_json: &str, window: Window, today: NaiveDate) -> Result<String> {
        let entries = JournalAdapter::from_json(journal_json)?;
        self.analyze(&entries, window, today).to_json()
    }

    /// Current streak for a raw journal JSON document
    pub fn streak_json(&self, journal_json: &str, today: NaiveDate) -> Result<u32> {
        let entries = JournalAdapter::from_json(journal_json)?;
        Ok(current_streak(&entries.daily, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{InsightKind, Priority};
    use crate::trend::{SymptomTrend, Trend};
    use crate::types::{Symptom, TimeOfDay};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()
    }

    fn scenario_json() -> &'static str {
        r#"{
            "daily_entries": [
                { "date": "2025-01-15", "time_of_day": "morning", "mood": "happy" },
                { "date": "2025-01-15", "time_of_day": "evening", "mood": "content" },
                {
                    "date": "2025-01-16",
                    "time_of_day": "morning",
                    "mood": "frustrated",
                    "hot_flashes": true,
                    "night_sweats": true
                }
            ],
            "cycle_entries": []
        }"#
    }

    #[test]
    fn test_week_scenario() {
        let entries = JournalAdapter::from_json(scenario_json()).unwrap();
        let report = InsightEngine::new().analyze(&entries, Window::Week, today());

        assert_eq!(report.streak, 2);
        assert_eq!(report.entries_in_window, 3);
        assert_eq!(report.window_start, NaiveDate::from_ymd_opt(2025, 1, 12).unwrap());

        let table = report.mood.table().unwrap();
        assert_eq!(table.total, 3);
        assert_eq!(table.count_of(Mood::Happy), 1);
        assert_eq!(table.count_of(Mood::Calm), 1);
        assert_eq!(table.count_of(Mood::Frustrated), 1);

        let top = report.ranked_symptoms[0];
        assert_eq!(top.symptom, Symptom::HotFlashes);
        assert_eq!(top.count, 1);
        assert_eq!(top.percentage.round(), 33.0);

        assert_eq!(
            report.trends.top_symptom,
            Some(SymptomTrend {
                symptom: Symptom::HotFlashes,
                trend: Trend::Stable
            })
        );
        assert!(report.insights.insights.len() <= 3);
    }

    #[test]
    fn test_low_priority_insight_never_leads_medium() {
        let entries = EntrySet {
            daily: (0..5)
                .map(|d| {
                    let mut e = DailyEntry::new(today() - chrono::Duration::days(d), TimeOfDay::Morning);
                    e.energy_level = Some(EnergyLevel::Low);
                    e
                })
                .collect(),
            ..Default::default()
        };
        let report = InsightEngine::new().analyze(&entries, Window::Month, today());

        let hero = report.insights.hero.unwrap();
        assert_eq!(hero.priority, Priority::Medium);
        assert_eq!(hero.title, "Your energy has been low");
        assert_eq!(report.insights.insights[1].title, "5-day streak");
    }

    #[test]
    fn test_new_user_scenario() {
        let report = InsightEngine::new().analyze(&EntrySet::default(), Window::Week, today());

        assert_eq!(report.streak, 0);
        assert!(report.sleep.is_no_data());
        assert!(report.mood.is_no_data());
        assert!(report.energy.is_no_data());
        assert!(report.symptoms.is_no_data());
        assert!(report.cycle.is_no_data());
        assert!(report.ranked_symptoms.is_empty());
        assert_eq!(report.wellness_score, None);

        assert_eq!(report.insights.insights.len(), 1);
        let only = &report.insights.insights[0];
        assert_eq!(only.priority, Priority::Low);
        assert_eq!(only.kind, InsightKind::Encouragement);
    }

    #[test]
    fn test_analyze_json_round_trip() {
        let json = analyze_journal_json(scenario_json(), "week", "2025-01-16").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["streak"], 2);
        assert_eq!(value["window"], "week");
        assert_eq!(value["sleep"]["status"], "no_data");
        assert_eq!(value["mood"]["status"], "observed");
    }

    #[test]
    fn test_boundary_errors() {
        assert!(matches!(
            analyze_journal_json(scenario_json(), "fortnight", "2025-01-16"),
            Err(EngineError::InvalidWindow(_))
        ));
        assert!(matches!(
            analyze_journal_json(scenario_json(), "week", "16/01/2025"),
            Err(EngineError::DateParseError(_))
        ));
        assert!(matches!(
            analyze_journal_json("{ not json", "week", "2025-01-16"),
            Err(EngineError::JsonError(_))
        ));
    }

    #[test]
    fn test_skipped_rows_are_reported() {
        let json = r#"{
            "daily_entries": [
                { "date": "yesterday", "time_of_day": "morning" },
                { "date": "2025-01-16", "time_of_day": "morning", "mood": "calm" }
            ]
        }"#;
        let entries = JournalAdapter::from_json(json).unwrap();
        let report = InsightEngine::new().analyze(&entries, Window::Day, today());

        assert_eq!(report.skipped_entries.len(), 1);
        assert_eq!(report.entries_in_window, 1);
        assert_eq!(report.streak, 1);
    }

    #[test]
    fn test_mistyped_row_does_not_fail_the_journal() {
        let json = r#"{
            "daily_entries": [
                { "date": "2025-01-16", "time_of_day": "morning", "mood": "calm" },
                { "date": null, "time_of_day": "evening", "mood": "sad" }
            ]
        }"#;
        let value: serde_json::Value =
            serde_json::from_str(&analyze_journal_json(json, "day", "2025-01-16").unwrap()).unwrap();

        assert_eq!(value["entries_in_window"], 1);
        assert_eq!(value["skipped_entries"][0]["reason"], "malformed");
        assert_eq!(value["streak"], 1);
    }

    #[test]
    fn test_future_entries_are_ignored() {
        let mut entries = EntrySet::default();
        entries
            .daily
            .push(DailyEntry::new(today() + chrono::Duration::days(1), TimeOfDay::Morning));

        let report = InsightEngine::new().analyze(&entries, Window::Month, today());
        assert_eq!(report.entries_in_window, 0);
        assert_eq!(report.longest_streak, 0);
        assert!(report.mood.is_no_data());
        // Not a new user: something is logged, just not yet in range
        assert_ne!(report.insights.insights[0].title, "Welcome to your journal");
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let entries = JournalAdapter::from_json(scenario_json()).unwrap();
        let engine = InsightEngine::new();

        let first = engine.analyze(&entries, Window::Month, today());
        let second = engine.analyze(&entries, Window::Month, today());
        assert_eq!(first, second);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = EngineConfig {
            max_insights: 0,
            ..EngineConfig::default()
        };
        assert!(InsightEngine::with_config(config).is_err());
    }

    #[test]
    fn test_engine_shared_across_threads() {
        let engine = Arc::new(InsightEngine::new());
        let entries = Arc::new(JournalAdapter::from_json(scenario_json()).unwrap());

        let handles: Vec<_> = [Window::Day, Window::Week, Window::Month, Window::Quarter]
            .into_iter()
            .map(|window| {
                let engine = Arc::clone(&engine);
                let entries = Arc::clone(&entries);
                thread::spawn(move || engine.analyze(&entries, window, today()).streak)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
