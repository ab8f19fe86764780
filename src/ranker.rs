//! Symptom frequency ranking

use serde::{Deserialize, Serialize};

use crate::metrics::percentage;
use crate::types::{DailyEntry, Symptom};

/// How often one symptom was flagged in a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymptomCount {
    pub symptom: Symptom,
    pub count: u32,
    /// Share of entries in the window that flagged the symptom
    pub percentage: f64,
}

/// A symptom position in the frequency ranking
pub type RankedSymptom = SymptomCount;

/// Count every symptom flag, in priority order, zeros included
pub fn count_symptoms(entries: &[DailyEntry]) -> Vec<SymptomCount> {
    let total = entries.len() as u32;
    Symptom::ALL
        .iter()
        .map(|symptom| {
            let count = entries.iter().filter(|e| e.has_symptom(*symptom)).count() as u32;
            SymptomCount {
                symptom: *symptom,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect()
}

/// Symptoms by descending count, ties in priority order; zero counts omitted
pub fn rank_symptoms(entries: &[DailyEntry]) -> Vec<RankedSymptom> {
    let mut ranked: Vec<RankedSymptom> = count_symptoms(entries)
        .into_iter()
        .filter(|c| c.count > 0)
        .collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.symptom.priority_rank().cmp(&b.symptom.priority_rank()))
    });
    ranked
}

/// The first `n` of an already ranked list
pub fn top_symptoms(ranked: &[RankedSymptom], n: usize) -> Vec<RankedSymptom> {
    ranked.iter().take(n).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeOfDay;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn entry(d: u32, symptoms: &[Symptom]) -> DailyEntry {
        let date = NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        let mut entry = DailyEntry::new(date, TimeOfDay::Evening);
        for symptom in symptoms {
            match symptom {
                Symptom::HotFlashes => entry.hot_flashes = true,
                Symptom::NightSweats => entry.night_sweats = true,
                Symptom::SleepIssues => entry.sleep_issues = true,
                Symptom::WokeUpNight => entry.woke_up_night = true,
                Symptom::ConcentrationDifficulty => entry.concentration_difficulty = true,
                Symptom::Pain => entry.pain = true,
                Symptom::Dryness => entry.dryness = true,
                Symptom::Bloating => entry.bloating = true,
                Symptom::SexualDesire => entry.sexual_desire = true,
            }
        }
        entry
    }

    fn order(ranked: &[RankedSymptom]) -> Vec<(Symptom, u32)> {
        ranked.iter().map(|r| (r.symptom, r.count)).collect()
    }

    #[test]
    fn test_rank_by_count_then_priority() {
        let entries = vec![
            entry(13, &[Symptom::Pain, Symptom::Bloating]),
            entry(14, &[Symptom::Bloating, Symptom::NightSweats]),
            entry(15, &[Symptom::Pain, Symptom::HotFlashes]),
            entry(16, &[Symptom::Pain]),
        ];

        assert_eq!(
            order(&rank_symptoms(&entries)),
            vec![
                (Symptom::Pain, 3),
                (Symptom::Bloating, 2),
                (Symptom::HotFlashes, 1),
                (Symptom::NightSweats, 1),
            ]
        );
    }

    #[test]
    fn test_priority_tie_break() {
        let entries = vec![entry(15, &[
            Symptom::SexualDesire,
            Symptom::WokeUpNight,
            Symptom::SleepIssues,
            Symptom::ConcentrationDifficulty,
        ])];

        let symptoms: Vec<Symptom> = rank_symptoms(&entries).iter().map(|r| r.symptom).collect();
        assert_eq!(
            symptoms,
            vec![
                Symptom::SleepIssues,
                Symptom::WokeUpNight,
                Symptom::ConcentrationDifficulty,
                Symptom::SexualDesire,
            ]
        );
    }

    #[test]
    fn test_percentage_uses_window_entries() {
        let entries = vec![entry(14, &[]), entry(15, &[]), entry(16, &[Symptom::HotFlashes])];
        let ranked = rank_symptoms(&entries);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].count, 1);
        assert!((ranked[0].percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_symptom_free_windows() {
        assert!(rank_symptoms(&[]).is_empty());
        assert!(rank_symptoms(&[entry(15, &[])]).is_empty());
        assert_eq!(count_symptoms(&[]).len(), Symptom::ALL.len());
    }

    #[test]
    fn test_top_symptoms() {
        let entries = vec![
            entry(14, &[Symptom::Pain, Symptom::Dryness, Symptom::Bloating, Symptom::HotFlashes]),
            entry(15, &[Symptom::Pain, Symptom::Dryness]),
        ];
        let ranked = rank_symptoms(&entries);

        let top = top_symptoms(&ranked, 3);
        assert_eq!(
            order(&top),
            vec![(Symptom::Pain, 2), (Symptom::Dryness, 2), (Symptom::HotFlashes, 1)]
        );
        assert_eq!(top_symptoms(&ranked, 10).len(), 4);
    }
}
