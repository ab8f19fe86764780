//! Core types for the journal insights engine
//!
//! This module defines the typed entry model the derivation stages operate on:
//! daily self-observations, cycle observations and the closed category enums
//! they carry. Raw storage rows are converted into these types by
//! [`crate::schema::JournalAdapter`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum number of characters kept from a free-text note
pub const MAX_NOTE_CHARS: usize = 500;

/// Time of day a daily entry was recorded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(TimeOfDay::Morning),
            "evening" => Some(TimeOfDay::Evening),
            _ => None,
        }
    }
}

/// A closed set of categorical values that can be tallied in a frequency table.
///
/// `ALL` lists the variants in canonical definition order. That order is the
/// tie-break for "most common": on equal counts the earlier variant wins.
pub trait Category: Copy + Eq + Ord + std::fmt::Debug + 'static {
    /// Every variant, in canonical definition order
    const ALL: &'static [Self];

    /// Machine name, matches the serialized form
    fn as_str(&self) -> &'static str;

    /// Human-readable label used in insight text
    fn label(&self) -> &'static str;

    /// Whether the value counts towards the category's "positive" share
    fn is_positive(&self) -> bool;

    /// Position in canonical order
    fn rank(&self) -> usize {
        Self::ALL
            .iter()
            .position(|candidate| candidate == self)
            .unwrap_or(usize::MAX)
    }

    /// Parse a machine name (case-insensitive)
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

/// Self-reported sleep quality (morning entries only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepQuality {
    Poor,
    Fair,
    Good,
}

impl SleepQuality {
    /// Ordinal score used for trend series (poor 1, fair 2, good 3)
    pub fn score(&self) -> f64 {
        match self {
            SleepQuality::Poor => 1.0,
            SleepQuality::Fair => 2.0,
            SleepQuality::Good => 3.0,
        }
    }

    /// Display score on a 0-100 scale
    pub fn percent_score(&self) -> f64 {
        match self {
            SleepQuality::Poor => 20.0,
            SleepQuality::Fair => 60.0,
            SleepQuality::Good => 100.0,
        }
    }
}

impl Category for SleepQuality {
    const ALL: &'static [Self] = &[SleepQuality::Poor, SleepQuality::Fair, SleepQuality::Good];

    fn as_str(&self) -> &'static str {
        match self {
            SleepQuality::Poor => "poor",
            SleepQuality::Fair => "fair",
            SleepQuality::Good => "good",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SleepQuality::Poor => "Poor",
            SleepQuality::Fair => "Fair",
            SleepQuality::Good => "Good",
        }
    }

    fn is_positive(&self) -> bool {
        matches!(self, SleepQuality::Good)
    }
}

/// Self-reported energy level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    /// Ordinal score used for trend series (low 1, medium 2, high 3)
    pub fn score(&self) -> f64 {
        match self {
            EnergyLevel::Low => 1.0,
            EnergyLevel::Medium => 2.0,
            EnergyLevel::High => 3.0,
        }
    }

    /// Display score on a 0-100 scale
    pub fn percent_score(&self) -> f64 {
        match self {
            EnergyLevel::Low => 20.0,
            EnergyLevel::Medium => 60.0,
            EnergyLevel::High => 100.0,
        }
    }
}

impl Category for EnergyLevel {
    const ALL: &'static [Self] = &[EnergyLevel::Low, EnergyLevel::Medium, EnergyLevel::High];

    fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "Low",
            EnergyLevel::Medium => "Medium",
            EnergyLevel::High => "High",
        }
    }

    fn is_positive(&self) -> bool {
        matches!(self, EnergyLevel::High)
    }
}

/// Self-reported mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Calm,
    Happy,
    Sad,
    Irritated,
    Frustrated,
}

impl Mood {
    /// Map a stored mood label, including retired aliases, to a canonical mood
    pub fn from_label(value: &str) -> Option<Self> {
        if let Some(mood) = <Mood as Category>::parse(value) {
            return Some(mood);
        }
        match value.trim().to_ascii_lowercase().as_str() {
            "content" | "relaxed" => Some(Mood::Calm),
            "joyful" => Some(Mood::Happy),
            "angry" => Some(Mood::Irritated),
            _ => None,
        }
    }
}

impl Category for Mood {
    const ALL: &'static [Self] = &[
        Mood::Calm,
        Mood::Happy,
        Mood::Sad,
        Mood::Irritated,
        Mood::Frustrated,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Mood::Calm => "calm",
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Irritated => "irritated",
            Mood::Frustrated => "frustrated",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Mood::Calm => "Calm",
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Irritated => "Irritated",
            Mood::Frustrated => "Frustrated",
        }
    }

    fn is_positive(&self) -> bool {
        matches!(self, Mood::Calm | Mood::Happy)
    }
}

/// Bleeding intensity on a period day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BleedingIntensity {
    Light,
    Medium,
    Heavy,
}

impl Category for BleedingIntensity {
    const ALL: &'static [Self] = &[
        BleedingIntensity::Light,
        BleedingIntensity::Medium,
        BleedingIntensity::Heavy,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            BleedingIntensity::Light => "light",
            BleedingIntensity::Medium => "medium",
            BleedingIntensity::Heavy => "heavy",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BleedingIntensity::Light => "Light",
            BleedingIntensity::Medium => "Medium",
            BleedingIntensity::Heavy => "Heavy",
        }
    }

    fn is_positive(&self) -> bool {
        false
    }
}

/// Boolean symptom flags tracked on daily entries.
///
/// Variant order is the fixed priority order used to break ranking ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    HotFlashes,
    NightSweats,
    SleepIssues,
    WokeUpNight,
    ConcentrationDifficulty,
    Pain,
    Dryness,
    Bloating,
    SexualDesire,
}

impl Symptom {
    /// Every symptom, in priority order
    pub const ALL: [Symptom; 9] = [
        Symptom::HotFlashes,
        Symptom::NightSweats,
        Symptom::SleepIssues,
        Symptom::WokeUpNight,
        Symptom::ConcentrationDifficulty,
        Symptom::Pain,
        Symptom::Dryness,
        Symptom::Bloating,
        Symptom::SexualDesire,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symptom::HotFlashes => "hot_flashes",
            Symptom::NightSweats => "night_sweats",
            Symptom::SleepIssues => "sleep_issues",
            Symptom::WokeUpNight => "woke_up_night",
            Symptom::ConcentrationDifficulty => "concentration_difficulty",
            Symptom::Pain => "pain",
            Symptom::Dryness => "dryness",
            Symptom::Bloating => "bloating",
            Symptom::SexualDesire => "sexual_desire",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Symptom::HotFlashes => "Hot flashes",
            Symptom::NightSweats => "Night sweats",
            Symptom::SleepIssues => "Sleep issues",
            Symptom::WokeUpNight => "Waking at night",
            Symptom::ConcentrationDifficulty => "Difficulty concentrating",
            Symptom::Pain => "Pain",
            Symptom::Dryness => "Dryness",
            Symptom::Bloating => "Bloating",
            Symptom::SexualDesire => "Changes in sexual desire",
        }
    }

    /// Position in the fixed priority order
    pub fn priority_rank(&self) -> usize {
        *self as usize
    }
}

/// One daily self-observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Nominal local calendar date
    pub date: NaiveDate,
    pub time_of_day: TimeOfDay,
    /// Only meaningful on morning entries
    pub sleep_quality: Option<SleepQuality>,
    /// Only meaningful on morning entries
    pub woke_up_night: bool,
    /// Only meaningful on morning entries
    pub night_sweats: bool,
    pub energy_level: Option<EnergyLevel>,
    pub mood: Option<Mood>,
    pub hot_flashes: bool,
    pub dryness: bool,
    pub pain: bool,
    pub bloating: bool,
    pub concentration_difficulty: bool,
    pub sleep_issues: bool,
    pub sexual_desire: bool,
    pub notes: Option<String>,
}

impl DailyEntry {
    /// An entry with no observations recorded
    pub fn new(date: NaiveDate, time_of_day: TimeOfDay) -> Self {
        Self {
            date,
            time_of_day,
            sleep_quality: None,
            woke_up_night: false,
            night_sweats: false,
            energy_level: None,
            mood: None,
            hot_flashes: false,
            dryness: false,
            pain: false,
            bloating: false,
            concentration_difficulty: false,
            sleep_issues: false,
            sexual_desire: false,
            notes: None,
        }
    }

    pub fn is_morning(&self) -> bool {
        self.time_of_day == TimeOfDay::Morning
    }

    /// Whether the given symptom flag is set
    pub fn has_symptom(&self, symptom: Symptom) -> bool {
        match symptom {
            Symptom::HotFlashes => self.hot_flashes,
            Symptom::NightSweats => self.night_sweats,
            Symptom::SleepIssues => self.sleep_issues,
            Symptom::WokeUpNight => self.woke_up_night,
            Symptom::ConcentrationDifficulty => self.concentration_difficulty,
            Symptom::Pain => self.pain,
            Symptom::Dryness => self.dryness,
            Symptom::Bloating => self.bloating,
            Symptom::SexualDesire => self.sexual_desire,
        }
    }

    /// Sleep quality, honouring morning-only semantics
    pub fn morning_sleep_quality(&self) -> Option<SleepQuality> {
        if self.is_morning() {
            self.sleep_quality
        } else {
            None
        }
    }

    pub fn has_note(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// One cycle observation for a calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleEntry {
    pub date: NaiveDate,
    pub is_period: bool,
    /// Only present when `is_period` is set
    pub bleeding_intensity: Option<BleedingIntensity>,
    /// Free-form symptom tags
    pub symptoms: BTreeSet<String>,
    pub notes: Option<String>,
}

impl CycleEntry {
    pub fn new(date: NaiveDate, is_period: bool) -> Self {
        Self {
            date,
            is_period,
            bleeding_intensity: None,
            symptoms: BTreeSet::new(),
            notes: None,
        }
    }
}

/// Anything resolvable to a calendar day
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for DailyEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for CycleEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl<T: Dated> Dated for &T {
    fn date(&self) -> NaiveDate {
        (*self).date()
    }
}

/// Why a raw row was left out of the typed entry set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InvalidDate,
    InvalidTimeOfDay,
    /// A field had the wrong JSON type
    Malformed,
    Duplicate,
}

/// Which collection a skipped row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Daily,
    Cycle,
}

/// A raw row that was skipped during conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Position of the row in its input collection
    pub index: usize,
    pub kind: EntryKind,
    pub reason: SkipReason,
    /// Raw value that caused the skip, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Typed snapshot of one user's journal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntrySet {
    pub daily: Vec<DailyEntry>,
    pub cycle: Vec<CycleEntry>,
    /// Rows dropped while building the snapshot
    #[serde(default)]
    pub skipped: Vec<SkippedEntry>,
}

impl EntrySet {
    pub fn new(daily: Vec<DailyEntry>, cycle: Vec<CycleEntry>) -> Self {
        Self {
            daily,
            cycle,
            skipped: Vec::new(),
        }
    }

    /// True for a brand new user with nothing logged
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty() && self.cycle.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_rank() {
        assert_eq!(SleepQuality::Poor.rank(), 0);
        assert_eq!(SleepQuality::Good.rank(), 2);
        assert_eq!(Mood::Frustrated.rank(), 4);
        assert!(Symptom::HotFlashes.priority_rank() < Symptom::NightSweats.priority_rank());
    }

    #[test]
    fn test_mood_aliases() {
        assert_eq!(Mood::from_label("content"), Some(Mood::Calm));
        assert_eq!(Mood::from_label("Happy"), Some(Mood::Happy));
        assert_eq!(Mood::from_label("angry"), Some(Mood::Irritated));
        assert_eq!(Mood::from_label("ecstatic"), None);
    }

    #[test]
    fn test_serialized_names_match_as_str() {
        for mood in Mood::ALL {
            let json = serde_json::to_string(mood).unwrap();
            assert_eq!(json, format!("\"{}\"", mood.as_str()));
        }
        for symptom in Symptom::ALL {
            let json = serde_json::to_string(&symptom).unwrap();
            assert_eq!(json, format!("\"{}\"", symptom.as_str()));
        }
    }

    #[test]
    fn test_sleep_quality_is_morning_only() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut evening = DailyEntry::new(date, TimeOfDay::Evening);
        evening.sleep_quality = Some(SleepQuality::Good);
        assert_eq!(evening.morning_sleep_quality(), None);

        let mut morning = DailyEntry::new(date, TimeOfDay::Morning);
        morning.sleep_quality = Some(SleepQuality::Poor);
        assert_eq!(morning.morning_sleep_quality(), Some(SleepQuality::Poor));
    }

    #[test]
    fn test_has_symptom_covers_every_flag() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut entry = DailyEntry::new(date, TimeOfDay::Morning);
        assert!(Symptom::ALL.iter().all(|s| !entry.has_symptom(*s)));

        entry.night_sweats = true;
        entry.sexual_desire = true;
        assert!(entry.has_symptom(Symptom::NightSweats));
        assert!(entry.has_symptom(Symptom::SexualDesire));
        assert!(!entry.has_symptom(Symptom::HotFlashes));
    }
}
