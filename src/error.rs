//! Error types for the journal insights engine
//!
//! Only boundary operations (document parsing, configuration loading, window
//! selection) can fail. The derivation functions themselves degrade to
//! partial or "no data" output instead of returning errors.

use thiserror::Error;

/// Errors that can occur at the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid window: {0} (expected day, week, month or quarter)")]
    InvalidWindow(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
