//! Per-category metric extraction
//!
//! Each extractor reduces a (usually windowed) entry collection to a frequency
//! table and a "most common" value. An empty input always produces
//! [`CategorySummary::NoData`]; no extractor invents a default category.

use serde::{Deserialize, Serialize};

use crate::ranker::{count_symptoms, SymptomCount};
use crate::types::{Category, DailyEntry, EnergyLevel, Mood, SleepQuality};

/// `count / total` as a percentage in `[0, 100]`; 0 when `total` is 0
pub fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((count as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
}

/// Count for one category value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount<T> {
    pub value: T,
    pub count: u32,
    pub percentage: f64,
}

/// Frequency table over every value of a category, in canonical order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable<T> {
    pub counts: Vec<CategoryCount<T>>,
    pub total: u32,
}

impl<T: Category> FrequencyTable<T> {
    /// Tally observed values
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut tallies = vec![0u32; T::ALL.len()];
        let mut total = 0u32;
        for value in values {
            if let Some(slot) = tallies.get_mut(value.rank()) {
                *slot += 1;
                total += 1;
            }
        }

        let counts = T::ALL
            .iter()
            .zip(tallies)
            .map(|(value, count)| CategoryCount {
                value: *value,
                count,
                percentage: percentage(count, total),
            })
            .collect();

        Self { counts, total }
    }

    pub fn count_of(&self, value: T) -> u32 {
        self.counts
            .iter()
            .find(|c| c.value == value)
            .map_or(0, |c| c.count)
    }

    pub fn percentage_of(&self, value: T) -> f64 {
        percentage(self.count_of(value), self.total)
    }

    /// Highest count; ties go to the value listed first in canonical order
    pub fn most_common(&self) -> Option<T> {
        let mut best: Option<&CategoryCount<T>> = None;
        for candidate in self.counts.iter().filter(|c| c.count > 0) {
            match best {
                Some(current) if current.count >= candidate.count => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|c| c.value)
    }

    /// Share of observations whose value counts as positive
    pub fn positive_percentage(&self) -> f64 {
        let positive = self
            .counts
            .iter()
            .filter(|c| c.value.is_positive())
            .map(|c| c.count)
            .sum();
        percentage(positive, self.total)
    }

    /// Count-weighted mean of a per-value score
    pub fn mean_score<F: Fn(T) -> f64>(&self, score: F) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let sum: f64 = self
            .counts
            .iter()
            .map(|c| score(c.value) * c.count as f64)
            .sum();
        Some(sum / self.total as f64)
    }
}

/// Result of a categorical extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategorySummary<T> {
    /// Nothing observed in the window
    NoData,
    Observed {
        table: FrequencyTable<T>,
        most_common: T,
        positive_percentage: f64,
    },
}

impl<T: Category> CategorySummary<T> {
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        let table = FrequencyTable::from_values(values);
        match table.most_common() {
            Some(most_common) => {
                let positive_percentage = table.positive_percentage();
                CategorySummary::Observed {
                    table,
                    most_common,
                    positive_percentage,
                }
            }
            None => CategorySummary::NoData,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, CategorySummary::NoData)
    }

    pub fn table(&self) -> Option<&FrequencyTable<T>> {
        match self {
            CategorySummary::NoData => None,
            CategorySummary::Observed { table, .. } => Some(table),
        }
    }

    pub fn most_common(&self) -> Option<T> {
        match self {
            CategorySummary::NoData => None,
            CategorySummary::Observed { most_common, .. } => Some(*most_common),
        }
    }

    pub fn positive_percentage(&self) -> Option<f64> {
        match self {
            CategorySummary::NoData => None,
            CategorySummary::Observed {
                positive_percentage,
                ..
            } => Some(*positive_percentage),
        }
    }

    /// Number of observations behind the summary
    pub fn total(&self) -> u32 {
        self.table().map_or(0, |t| t.total)
    }
}

/// Sleep quality distribution over morning entries
pub fn sleep_summary(entries: &[DailyEntry]) -> CategorySummary<SleepQuality> {
    CategorySummary::from_values(entries.iter().filter_map(|e| e.morning_sleep_quality()))
}

/// Mood distribution; calm and happy count as positive
pub fn mood_summary(entries: &[DailyEntry]) -> CategorySummary<Mood> {
    CategorySummary::from_values(entries.iter().filter_map(|e| e.mood))
}

/// Energy level distribution; high counts as positive
pub fn energy_summary(entries: &[DailyEntry]) -> CategorySummary<EnergyLevel> {
    CategorySummary::from_values(entries.iter().filter_map(|e| e.energy_level))
}

/// Symptom occurrence across a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymptomSummary {
    NoData,
    Observed {
        /// Entries in the window, the percentage denominator
        entries: u32,
        /// Every tracked symptom, in priority order
        counts: Vec<SymptomCount>,
    },
}

impl SymptomSummary {
    pub fn is_no_data(&self) -> bool {
        matches!(self, SymptomSummary::NoData)
    }

    pub fn counts(&self) -> &[SymptomCount] {
        match self {
            SymptomSummary::NoData => &[],
            SymptomSummary::Observed { counts, .. } => counts,
        }
    }
}

/// Per-symptom `true` counts; percentage is over all entries in the window
pub fn symptom_summary(entries: &[DailyEntry]) -> SymptomSummary {
    if entries.is_empty() {
        return SymptomSummary::NoData;
    }
    SymptomSummary::Observed {
        entries: entries.len() as u32,
        counts: count_symptoms(entries),
    }
}

/// Share of hot-flash entries that report disturbed sleep on the same entry:
/// a poor night, waking in the night or sleep issues. `None` without hot flashes.
pub fn hot_flash_sleep_overlap(entries: &[DailyEntry]) -> Option<f64> {
    let flashes: Vec<&DailyEntry> = entries.iter().filter(|e| e.hot_flashes).collect();
    if flashes.is_empty() {
        return None;
    }
    let disturbed = flashes
        .iter()
        .filter(|e| {
            e.morning_sleep_quality() == Some(SleepQuality::Poor) || e.woke_up_night || e.sleep_issues
        })
        .count();
    Some(percentage(disturbed as u32, flashes.len() as u32))
}

/// Overall 0-100 wellness score from sleep, energy and mood.
///
/// Each available factor contributes equally; `None` when all are missing.
pub fn wellness_score(
    sleep: &CategorySummary<SleepQuality>,
    energy: &CategorySummary<EnergyLevel>,
    mood: &CategorySummary<Mood>,
) -> Option<f64> {
    let factors: Vec<f64> = [
        sleep.table().and_then(|t| t.mean_score(|q| q.percent_score())),
        energy.table().and_then(|t| t.mean_score(|e| e.percent_score())),
        mood.positive_percentage(),
    ]
    .into_iter()
    .flatten()
    .collect();

    if factors.is_empty() {
        return None;
    }
    let mean = factors.iter().sum::<f64>() / factors.len() as f64;
    Some(mean.round().clamp(0.0, 100.0))
}
