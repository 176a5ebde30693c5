//! Prophylaxis Core Library
//!
//! Local-first efficacy reporting for injectable migraine prophylaxis.
//!
//! # Architecture
//!
//! ```text
//! Diary rows   Intake rows   Reminder rows   Completion rows
//!      │            │              │                │
//!      └────────────┴──────┬───────┴────────────────┘
//!                          ▼
//!                   Record Adapter ──────────────┐
//!                          │                     │
//!                          ▼                     ▼
//!   ┌──────────────────────────────────┐  Day Feature Builder
//!   │        Evidence Resolver         │         │
//!   │  collect → score → cluster       │         │
//!   │  → canonical dose events         │         │
//!   └────────────────┬─────────────────┘         │
//!                    │                           │
//!                    └────────────┬──────────────┘
//!                                 ▼
//!                          Window Analyzer
//!                      (pre/post, aggregate)
//!                                 │
//!                     ┌───────────┴───────────┐
//!                     ▼                       ▼
//!                Report Text             Report Table
//!             (hedged wording)        (JSON/CSV, hashed)
//! ```
//!
//! # Core Principle
//!
//! **Correlation, never causation.** Reports state what was documented, with
//! explicit confidence and coverage caveats. Nothing here diagnoses or
//! recommends a change of treatment.
//!
//! # Modules
//!
//! - [`calendar`]: Europe/Berlin calendar-day keys and arithmetic
//! - [`registry`]: Drug profiles and alias matching
//! - [`adapter`]: Raw upstream rows into typed sources
//! - [`resolver`]: Evidence collection, scoring and clustering
//! - [`analysis`]: Day features, window statistics, orchestration
//! - [`export`]: Report text and tabular payload
//! - [`models`]: Domain types
//! - [`config`]: Analysis configuration

pub mod adapter;
pub mod analysis;
pub mod calendar;
pub mod config;
pub mod export;
pub mod models;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use analysis::{AnalysisError, ProphylaxisAnalyzer};
pub use calendar::{CalendarError, DayKey, DayRange};
pub use config::AnalysisConfig;
pub use export::{generate_report_text, Report, ReportTable, ReportText};
pub use models::{
    ConfidenceBand, DoseEvent, DoseEvidence, EvidenceSourceKind, ProphylaxisAnalysis,
    RecordBundle,
};
pub use registry::{DrugProfile, DrugRegistry};
pub use resolver::EvidenceResolver;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use chrono::{DateTime, Utc};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ProphylaxisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calendar error: {0}")]
    CalendarError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<CalendarError> for ProphylaxisError {
    fn from(e: CalendarError) -> Self {
        ProphylaxisError::CalendarError(e.to_string())
    }
}

impl From<config::ConfigError> for ProphylaxisError {
    fn from(e: config::ConfigError) -> Self {
        ProphylaxisError::ConfigError(e.to_string())
    }
}

impl From<AnalysisError> for ProphylaxisError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::Calendar(e) => e.into(),
            AnalysisError::Config(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for ProphylaxisError {
    fn from(e: serde_json::Error) -> Self {
        ProphylaxisError::SerializationError(e.to_string())
    }
}

impl From<chrono::ParseError> for ProphylaxisError {
    fn from(e: chrono::ParseError) -> Self {
        ProphylaxisError::InvalidInput(format!("Invalid timestamp: {}", e))
    }
}

fn parse_utc(timestamp: &str) -> Result<DateTime<Utc>, ProphylaxisError> {
    Ok(DateTime::parse_from_rfc3339(timestamp)?.with_timezone(&Utc))
}

// =========================================================================
// Analysis Operations
// =========================================================================

/// Analyze a drug over an inclusive Berlin date range.
///
/// `bundle_json` is a serialized [`RecordBundle`]; `now` is an RFC 3339
/// timestamp. Returns the serialized [`ProphylaxisAnalysis`].
#[uniffi::export]
pub fn analyze_prophylaxis_json(
    drug_id: String,
    range_start: String,
    range_end: String,
    now: String,
    bundle_json: String,
    config_json: Option<String>,
) -> Result<String, ProphylaxisError> {
    if drug_id.trim().is_empty() {
        return Err(ProphylaxisError::InvalidInput("Empty drug id".to_string()));
    }

    let range = DayRange::parse(&range_start, &range_end)?;
    let now = parse_utc(&now)?;
    let bundle: RecordBundle = serde_json::from_str(&bundle_json)?;
    let config = match config_json {
        Some(json) => AnalysisConfig::from_json(&json)?,
        None => AnalysisConfig::default(),
    };

    let registry = DrugRegistry::new();
    let analysis = ProphylaxisAnalyzer::new(&registry)
        .with_config(config)
        .analyze(&drug_id, &bundle, range, now)?;

    Ok(serde_json::to_string(&analysis)?)
}

/// Build report text and table from a serialized analysis.
#[uniffi::export]
pub fn generate_report_json(analysis_json: String) -> Result<String, ProphylaxisError> {
    let analysis: ProphylaxisAnalysis = serde_json::from_str(&analysis_json)?;
    let report = Report::from_analysis(&analysis)?;
    Ok(report.to_json()?)
}

/// Tabular report for a serialized analysis, as CSV.
#[uniffi::export]
pub fn export_report_csv(analysis_json: String) -> Result<String, ProphylaxisError> {
    let analysis: ProphylaxisAnalysis = serde_json::from_str(&analysis_json)?;
    Ok(ReportTable::from_analysis(&analysis)?.to_csv())
}

// =========================================================================
// Registry Operations
// =========================================================================

/// All built-in drug profiles, ordered by ID.
#[uniffi::export]
pub fn list_drug_profiles() -> Vec<FfiDrugProfile> {
    DrugRegistry::new()
        .profiles()
        .map(FfiDrugProfile::from)
        .collect()
}

/// Canonical drug ID for a typed name, tolerating small typos.
#[uniffi::export]
pub fn resolve_drug_id(name: String) -> Option<String> {
    DrugRegistry::new().suggest(&name).map(|p| p.id.clone())
}

// =========================================================================
// Calendar Operations
// =========================================================================

/// Shift a `YYYY-MM-DD` Berlin day key by whole days.
#[uniffi::export]
pub fn add_berlin_days(day_key: String, offset: i64) -> Result<String, ProphylaxisError> {
    Ok(calendar::add_berlin_days(&day_key, offset)?)
}

/// Whole days from `from` to `to`.
#[uniffi::export]
pub fn diff_berlin_days(from: String, to: String) -> Result<i64, ProphylaxisError> {
    Ok(calendar::diff_berlin_days(&from, &to)?)
}

/// Berlin day key of an RFC 3339 instant.
#[uniffi::export]
pub fn berlin_day_key(timestamp: String) -> Result<String, ProphylaxisError> {
    Ok(calendar::berlin_day_key(&parse_utc(&timestamp)?))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe drug profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugProfile {
    pub id: String,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub typical_interval_days: Option<u32>,
}

impl From<&DrugProfile> for FfiDrugProfile {
    fn from(profile: &DrugProfile) -> Self {
        Self {
            id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            aliases: profile.aliases.clone(),
            typical_interval_days: profile.typical_interval_days,
        }
    }
}
