//! Logging streaks
//!
//! A streak is the number of consecutive calendar days, ending today, on which
//! at least one entry exists. Streaks are per day, not per entry: a morning and
//! an evening entry on the same date count once.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::types::Dated;

/// Streak lengths that earn a milestone
pub const STREAK_MILESTONES: [u32; 4] = [3, 7, 14, 30];

/// Consecutive days with an entry, counting back from `today`.
///
/// Returns 0 when nothing was logged today, whatever came before.
pub fn current_streak<T: Dated>(entries: &[T], today: NaiveDate) -> u32 {
    let days = unique_days(entries);

    let mut streak = 0;
    let mut expected = today;
    while days.contains(&expected) {
        streak += 1;
        expected = expected - Duration::days(1);
    }
    streak
}

/// Longest run of consecutive logged days anywhere in the history
pub fn longest_streak<T: Dated>(entries: &[T]) -> u32 {
    let days = unique_days(entries);

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Next milestone above `streak`, if any remain
pub fn next_milestone(streak: u32) -> Option<u32> {
    STREAK_MILESTONES.iter().copied().find(|m| *m > streak)
}

fn unique_days<T: Dated>(entries: &[T]) -> BTreeSet<NaiveDate> {
    entries.iter().map(|e| e.date()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DailyEntry, TimeOfDay};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()
    }

    fn entry(days_ago: i64, time_of_day: TimeOfDay) -> DailyEntry {
        DailyEntry::new(today() - Duration::days(days_ago), time_of_day)
    }

    #[test]
    fn test_empty_history() {
        let entries: Vec<DailyEntry> = vec![];
        assert_eq!(current_streak(&entries, today()), 0);
        assert_eq!(longest_streak(&entries), 0);
    }

    #[test]
    fn test_morning_and_evening_count_once() {
        let entries = vec![
            entry(0, TimeOfDay::Morning),
            entry(0, TimeOfDay::Evening),
            entry(1, TimeOfDay::Evening),
        ];
        assert_eq!(current_streak(&entries, today()), 2);
    }

    #[test]
    fn test_gap_resets_streak() {
        let entries = vec![
            entry(3, TimeOfDay::Morning),
            entry(0, TimeOfDay::Morning),
            entry(1, TimeOfDay::Morning),
        ];
        assert_eq!(current_streak(&entries, today()), 2);
    }

    #[test]
    fn test_no_entry_today_means_zero() {
        let entries: Vec<DailyEntry> = (1..=10).map(|d| entry(d, TimeOfDay::Morning)).collect();
        assert_eq!(current_streak(&entries, today()), 0);
        assert_eq!(longest_streak(&entries), 10);
    }

    #[test]
    fn test_future_entries_do_not_extend_streak() {
        let entries = vec![entry(-1, TimeOfDay::Morning), entry(0, TimeOfDay::Morning)];
        assert_eq!(current_streak(&entries, today()), 1);
    }

    #[test]
    fn test_streak_is_deterministic() {
        let entries = vec![
            entry(2, TimeOfDay::Evening),
            entry(0, TimeOfDay::Morning),
            entry(1, TimeOfDay::Morning),
        ];
        let first = current_streak(&entries, today());
        let second = current_streak(&entries, today());
        assert_eq!(first, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_longest_streak_across_gaps() {
        let entries = vec![
            entry(0, TimeOfDay::Morning),
            entry(5, TimeOfDay::Morning),
            entry(6, TimeOfDay::Morning),
            entry(7, TimeOfDay::Evening),
            entry(7, TimeOfDay::Morning),
        ];
        assert_eq!(longest_streak(&entries), 3);
    }

    #[test]
    fn test_next_milestone() {
        assert_eq!(next_milestone(0), Some(3));
        assert_eq!(next_milestone(3), Some(7));
        assert_eq!(next_milestone(20), Some(30));
        assert_eq!(next_milestone(30), None);
    }
}
