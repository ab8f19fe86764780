//! Journal Insights - deterministic derivation engine for symptom journals
//!
//! Turns twice-daily self-observations (sleep, mood, energy, symptoms) and
//! cycle observations into streaks, windowed statistics, trend labels, a ranked
//! symptom list and prioritized insights:
//! raw rows → typed entries → window → extractors → trends → insights.
//!
//! Every call is a pure function of the entry snapshot, the window, the
//! reference date and the configuration. Nothing is stored between calls.

pub mod config;
pub mod cycle;
pub mod error;
pub mod insights;
pub mod metrics;
pub mod norm;
pub mod pipeline;
pub mod ranker;
pub mod schema;
pub mod streak;
pub mod trend;
pub mod types;
pub mod window;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use insights::{Insight, InsightReport};
pub use pipeline::{analyze_journal_json, AnalysisReport, InsightEngine};
pub use schema::{JournalAdapter, RawJournal};
pub use types::{CycleEntry, DailyEntry, EntrySet};
pub use window::Window;

/// Engine version reported by the CLI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
