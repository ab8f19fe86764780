//! Insights CLI - Command-line interface for the journal insights engine
//!
//! Commands:
//! - analyze: Derive streaks, statistics, trends and insights for a window
//! - streak: Print the current logging streak
//! - validate: Report journal rows that would be skipped
//! - config: Print the default engine configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use journal_insights::pipeline::parse_reference_date;
use journal_insights::schema::JournalAdapter;
use journal_insights::streak::{current_streak, longest_streak, next_milestone};
use journal_insights::types::{EntryKind, SkipReason};
use journal_insights::{EngineConfig, EngineError, InsightEngine, Window, ENGINE_VERSION};

/// Insights - derive streaks, trends and insights from a symptom journal
#[derive(Parser)]
#[command(name = "insights")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Derive streaks, trends and insights from a symptom journal", long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a journal for one window
    Analyze {
        /// Journal JSON file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Window: day, week, month or quarter
        #[arg(short, long, default_value = "week")]
        window: String,

        /// Reference date (YYYY-MM-DD), defaults to the local date
        #[arg(long)]
        today: Option<String>,

        /// Engine configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Print the current logging streak
    Streak {
        /// Journal JSON file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Reference date (YYYY-MM-DD), defaults to the local date
        #[arg(long)]
        today: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report journal rows that would be skipped
    Validate {
        /// Journal JSON file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default engine configuration as JSON
    Config,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr).compact())
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), InsightsCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            window,
            today,
            config,
            output_format,
        } => cmd_analyze(&input, &window, today.as_deref(), config.as_deref(), output_format),

        Commands::Streak { input, today, json } => cmd_streak(&input, today.as_deref(), json),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Config => cmd_config(),
    }
}

fn cmd_analyze(
    input: &Path,
    window: &str,
    today: Option<&str>,
    config: Option<&Path>,
    output_format: OutputFormat,
) -> Result<(), InsightsCliError> {
    let window: Window = window.parse()?;
    let today = reference_date(today)?;

    let engine = match config {
        Some(path) => InsightEngine::with_config(EngineConfig::from_json(&fs::read_to_string(path)?)?)?,
        None => InsightEngine::new(),
    };

    let entries = JournalAdapter::from_json(&read_input(input)?)?;
    let report = engine.analyze(&entries, window, today);

    let output = match output_format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::JsonPretty => report.to_json_pretty()?,
    };
    println!("{}", output);

    Ok(())
}

fn cmd_streak(input: &Path, today: Option<&str>, json: bool) -> Result<(), InsightsCliError> {
    let today = reference_date(today)?;
    let entries = JournalAdapter::from_json(&read_input(input)?)?;

    let history: Vec<_> = entries.daily.iter().filter(|e| e.date <= today).collect();
    let current = current_streak(&history, today);
    let report = StreakReport {
        today,
        current,
        longest: longest_streak(&history),
        next_milestone: next_milestone(current),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Current streak: {} days", report.current);
        println!("Longest streak: {} days", report.longest);
        if let Some(milestone) = report.next_milestone {
            println!("Next milestone: {} days", milestone);
        }
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), InsightsCliError> {
    let journal = JournalAdapter::parse_json(&read_input(input)?)?;
    let invalid = JournalAdapter::validate_rows(&journal);
    let entries = JournalAdapter::to_entries(&journal);

    let report = ValidationReport {
        daily_rows: journal.daily_entries.len(),
        cycle_rows: journal.cycle_entries.len(),
        daily_kept: entries.daily.len(),
        cycle_kept: entries.cycle.len(),
        skipped: entries
            .skipped
            .iter()
            .map(|s| {
                let error = match s.reason {
                    SkipReason::Duplicate => "duplicate row, a later row replaces it".to_string(),
                    _ => invalid
                        .iter()
                        .find(|v| v.index == s.index && v.kind == s.kind)
                        .map(|v| v.error.to_string())
                        .unwrap_or_else(|| format!("{:?}", s.reason)),
                };
                SkippedRowDetail {
                    kind: match s.kind {
                        EntryKind::Daily => "daily",
                        EntryKind::Cycle => "cycle",
                    },
                    index: s.index,
                    error,
                }
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Daily rows: {} ({} kept)", report.daily_rows, report.daily_kept);
        println!("Cycle rows: {} ({} kept)", report.cycle_rows, report.cycle_kept);

        if !report.skipped.is_empty() {
            println!("\nSkipped:");
            for row in &report.skipped {
                println!("  - {} row {}: {}", row.kind, row.index, row.error);
            }
        }
    }

    let invalid_rows = invalid.len();
    if invalid_rows > 0 {
        Err(InsightsCliError::ValidationFailed(invalid_rows))
    } else {
        Ok(())
    }
}

fn cmd_config() -> Result<(), InsightsCliError> {
    println!("{}", EngineConfig::default().to_json()?);
    Ok(())
}

fn read_input(input: &Path) -> Result<String, InsightsCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(InsightsCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn reference_date(today: Option<&str>) -> Result<NaiveDate, InsightsCliError> {
    match today {
        Some(value) => Ok(parse_reference_date(value)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

// Error types

#[derive(Debug)]
enum InsightsCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoInput,
    ValidationFailed(usize),
}

impl From<io::Error> for InsightsCliError {
    fn from(e: io::Error) -> Self {
        InsightsCliError::Io(e)
    }
}

impl From<EngineError> for InsightsCliError {
    fn from(e: EngineError) -> Self {
        InsightsCliError::Engine(e)
    }
}

impl From<serde_json::Error> for InsightsCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightsCliError> for CliError {
    fn from(e: InsightsCliError) -> Self {
        match e {
            InsightsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightsCliError::Engine(e) => {
                let hint = match &e {
                    EngineError::InvalidWindow(_) => "Use one of: day, week, month, quarter",
                    EngineError::InvalidConfig(_) => "Run 'insights config' for a valid starting point",
                    EngineError::DateParseError(_) => "Dates use the YYYY-MM-DD format",
                    _ => "Ensure input has daily_entries and cycle_entries arrays",
                };
                CliError {
                    code: "ENGINE_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            InsightsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightsCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, expected a piped journal".to_string(),
                hint: Some("Pipe a journal file or pass --input <file>".to_string()),
            },
            InsightsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix the reported rows and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct StreakReport {
    today: NaiveDate,
    current: u32,
    longest: u32,
    next_milestone: Option<u32>,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    daily_rows: usize,
    cycle_rows: usize,
    daily_kept: usize,
    cycle_kept: usize,
    skipped: Vec<SkippedRowDetail>,
}

#[derive(serde::Serialize)]
struct SkippedRowDetail {
    kind: &'static str,
    index: usize,
    error: String,
}
