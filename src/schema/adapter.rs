//! Adapter for converting raw journal rows into the typed entry model
//!
//! Conversion never fails as a whole. Rows with mistyped fields or without a
//! usable date or time of day are skipped and reported, unknown category values are dropped from the
//! row, and duplicate keys keep the later row.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::EngineError;
use crate::schema::raw_entry::*;
use crate::types::{
    BleedingIntensity, Category, CycleEntry, DailyEntry, EnergyLevel, EntryKind, EntrySet, Mood,
    SkipReason, SkippedEntry, SleepQuality, TimeOfDay, MAX_NOTE_CHARS,
};

/// Adapter for converting raw journal rows to typed entries
pub struct JournalAdapter;

impl JournalAdapter {
    /// Parse a JSON journal document (`daily_entries` / `cycle_entries`)
    pub fn parse_json(json: &str) -> Result<RawJournal, EngineError> {
        let journal: RawJournal = serde_json::from_str(json)?;
        Ok(journal)
    }

    /// Convert a raw journal into a typed entry set
    pub fn to_entries(journal: &RawJournal) -> EntrySet {
        let mut skipped = Vec::new();
        let daily = convert_daily(&journal.daily_entries, &mut skipped);
        let cycle = convert_cycle(&journal.cycle_entries, &mut skipped);

        if !skipped.is_empty() {
            debug!(
                skipped = skipped.len(),
                daily = daily.len(),
                cycle = cycle.len(),
                "Skipped malformed or duplicate journal rows"
            );
        }

        skipped.sort_by_key(|s| (s.kind == EntryKind::Cycle, s.index));

        EntrySet {
            daily,
            cycle,
            skipped,
        }
    }

    /// Parse and convert in one step
    pub fn from_json(json: &str) -> Result<EntrySet, EngineError> {
        let journal = Self::parse_json(json)?;
        Ok(Self::to_entries(&journal))
    }

    /// Validate every row without converting
    pub fn validate_rows(journal: &RawJournal) -> Vec<ValidationResult> {
        let daily = journal
            .daily_entries
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let error = raw.row().and_then(|row| row.validate()).err()?;
                Some(ValidationResult {
                    index,
                    kind: EntryKind::Daily,
                    row_id: raw.row().ok().and_then(|row| row.id.clone()),
                    error,
                })
            });

        let cycle = journal
            .cycle_entries
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let error = raw.row().and_then(|row| row.validate()).err()?;
                Some(ValidationResult {
                    index,
                    kind: EntryKind::Cycle,
                    row_id: raw.row().ok().and_then(|row| row.id.clone()),
                    error,
                })
            });

        daily.chain(cycle).collect()
    }
}

/// Result of row validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub kind: EntryKind,
    pub row_id: Option<String>,
    pub error: ValidationError,
}

fn convert_daily(rows: &[RawRow<RawDailyEntry>], skipped: &mut Vec<SkippedEntry>) -> Vec<DailyEntry> {
    let mut entries: Vec<DailyEntry> = Vec::with_capacity(rows.len());
    let mut source_index: Vec<usize> = Vec::with_capacity(rows.len());
    let mut by_key: HashMap<(chrono::NaiveDate, TimeOfDay), usize> = HashMap::new();

    for (index, raw) in rows.iter().enumerate() {
        let (row, (date, time_of_day)) = match raw.row().and_then(|row| Ok((row, row.validate()?))) {
            Ok(checked) => checked,
            Err(error) => {
                debug!(index, %error, "Skipping daily row");
                skipped.push(skip_for(index, EntryKind::Daily, &error));
                continue;
            }
        };

        let entry = DailyEntry {
            date,
            time_of_day,
            sleep_quality: category_field::<SleepQuality>(index, "sleep_quality", &row.sleep_quality),
            woke_up_night: row.woke_up_night.unwrap_or(false),
            night_sweats: row.night_sweats.unwrap_or(false),
            energy_level: category_field::<EnergyLevel>(index, "energy_level", &row.energy_level),
            mood: mood_field(index, &row.mood),
            hot_flashes: row.hot_flashes.unwrap_or(false),
            dryness: row.dryness.unwrap_or(false),
            pain: row.pain.unwrap_or(false),
            bloating: row.bloating.unwrap_or(false),
            concentration_difficulty: row.concentration_difficulty.unwrap_or(false),
            sleep_issues: row.sleep_issues.unwrap_or(false),
            sexual_desire: row.sexual_desire.unwrap_or(false),
            notes: bounded_note(&row.notes),
        };

        match by_key.get(&(date, time_of_day)) {
            Some(&slot) => {
                // Later row is the edited one
                skipped.push(SkippedEntry {
                    index: source_index[slot],
                    kind: EntryKind::Daily,
                    reason: SkipReason::Duplicate,
                    detail: Some(format!("{} {}", date, time_of_day.as_str())),
                });
                entries[slot] = entry;
                source_index[slot] = index;
            }
            None => {
                by_key.insert((date, time_of_day), entries.len());
                entries.push(entry);
                source_index.push(index);
            }
        }
    }

    entries
}

fn convert_cycle(rows: &[RawRow<RawCycleEntry>], skipped: &mut Vec<SkippedEntry>) -> Vec<CycleEntry> {
    let mut entries: Vec<CycleEntry> = Vec::with_capacity(rows.len());
    let mut source_index: Vec<usize> = Vec::with_capacity(rows.len());
    let mut by_date: HashMap<chrono::NaiveDate, usize> = HashMap::new();

    for (index, raw) in rows.iter().enumerate() {
        let (row, date) = match raw.row().and_then(|row| Ok((row, row.validate()?))) {
            Ok(checked) => checked,
            Err(error) => {
                debug!(index, %error, "Skipping cycle row");
                skipped.push(skip_for(index, EntryKind::Cycle, &error));
                continue;
            }
        };

        let is_period = row.is_period.unwrap_or(false);
        let bleeding_intensity = if is_period {
            category_field::<BleedingIntensity>(index, "bleeding_intensity", &row.bleeding_intensity)
        } else {
            None
        };

        let symptoms: BTreeSet<String> = row
            .symptoms
            .iter()
            .flatten()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        let entry = CycleEntry {
            date,
            is_period,
            bleeding_intensity,
            symptoms,
            notes: bounded_note(&row.notes),
        };

        match by_date.get(&date) {
            Some(&slot) => {
                skipped.push(SkippedEntry {
                    index: source_index[slot],
                    kind: EntryKind::Cycle,
                    reason: SkipReason::Duplicate,
                    detail: Some(date.to_string()),
                });
                entries[slot] = entry;
                source_index[slot] = index;
            }
            None => {
                by_date.insert(date, entries.len());
                entries.push(entry);
                source_index.push(index);
            }
        }
    }

    entries
}

fn skip_for(index: usize, kind: EntryKind, error: &ValidationError) -> SkippedEntry {
    let (reason, detail) = match error {
        ValidationError::InvalidDate(value) => (SkipReason::InvalidDate, value.clone()),
        ValidationError::InvalidTimeOfDay(value) => (SkipReason::InvalidTimeOfDay, value.clone()),
        ValidationError::Malformed(message) => (SkipReason::Malformed, message.clone()),
    };
    SkippedEntry {
        index,
        kind,
        reason,
        detail: Some(detail),
    }
}

fn category_field<T: Category>(index: usize, field: &str, value: &Option<String>) -> Option<T> {
    let raw = value.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = T::parse(raw);
    if parsed.is_none() {
        debug!(index, field, value = raw, "Dropping unknown category value");
    }
    parsed
}

fn mood_field(index: usize, value: &Option<String>) -> Option<Mood> {
    let raw = value.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = Mood::from_label(raw);
    if parsed.is_none() {
        debug!(index, value = raw, "Dropping unknown mood");
    }
    parsed
}

fn bounded_note(note: &Option<String>) -> Option<String> {
    let note = note.as_deref()?.trim();
    if note.is_empty() {
        return None;
    }
    Some(note.chars().take(MAX_NOTE_CHARS).collect())
}
