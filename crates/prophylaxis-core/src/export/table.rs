//! Tabular report payload for document export.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{DoseComparison, ProphylaxisAnalysis};

pub const FORMAT_VERSION: &str = "1.0";
pub const HASH_ALGORITHM: &str = "SHA-256";

/// One dose comparison as a flat row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRow {
    pub day: String,
    pub time: Option<String>,
    /// Dominant evidence source
    pub source: String,
    pub confidence: f64,
    pub evidence_count: u32,
    pub pre_documented_days: u32,
    pub pre_coverage: f64,
    pub pre_headache_rate: f64,
    pub pre_intensity_mean: Option<f64>,
    pub pre_acute_med_rate: f64,
    pub post_documented_days: u32,
    pub post_coverage: f64,
    pub post_headache_rate: f64,
    pub post_intensity_mean: Option<f64>,
    pub post_acute_med_rate: f64,
    pub headache_rate_delta: f64,
    pub intensity_delta: Option<f64>,
    pub acute_med_rate_delta: f64,
}

impl From<&DoseComparison> for ReportRow {
    fn from(comparison: &DoseComparison) -> Self {
        let event = &comparison.event;
        Self {
            day: event.day.to_string(),
            time: event.time_label.clone(),
            source: event.dominant_source.label().to_string(),
            confidence: event.confidence.value(),
            evidence_count: event.evidence.len() as u32,
            pre_documented_days: comparison.pre.documented_days,
            pre_coverage: comparison.pre.coverage,
            pre_headache_rate: comparison.pre.headache_rate,
            pre_intensity_mean: comparison.pre.intensity_mean,
            pre_acute_med_rate: comparison.pre.acute_med_rate,
            post_documented_days: comparison.post.documented_days,
            post_coverage: comparison.post.coverage,
            post_headache_rate: comparison.post.headache_rate,
            post_intensity_mean: comparison.post.intensity_mean,
            post_acute_med_rate: comparison.post.acute_med_rate,
            headache_rate_delta: comparison.headache_rate_delta,
            intensity_delta: comparison.intensity_delta,
            acute_med_rate_delta: comparison.acute_med_rate_delta,
        }
    }
}

/// Report table metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    pub format_version: String,
    pub drug_id: String,
    pub display_name: String,
    pub range_start: String,
    pub range_end: String,
    pub pre_window_days: u32,
    pub post_window_days: u32,
    pub hash_algorithm: String,
    /// Fingerprint of the analysis the table was built from
    pub analysis_hash: String,
}

/// Tabular report: metadata plus one row per dose.
///
/// Carries no export timestamp, so the same analysis always serializes to the
/// same bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportTable {
    pub metadata: ReportMetadata,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn from_analysis(analysis: &ProphylaxisAnalysis) -> Result<Self, serde_json::Error> {
        Ok(Self {
            metadata: ReportMetadata {
                format_version: FORMAT_VERSION.to_string(),
                drug_id: analysis.drug_id.clone(),
                display_name: analysis.display_name.clone(),
                range_start: analysis.range.start.to_string(),
                range_end: analysis.range.end.to_string(),
                pre_window_days: analysis.config.pre_window_days,
                post_window_days: analysis.config.post_window_days,
                hash_algorithm: HASH_ALGORITHM.to_string(),
                analysis_hash: analysis_hash(analysis)?,
            },
            rows: analysis.comparisons.iter().map(ReportRow::from).collect(),
        })
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("drug_id,day,time,source,confidence,evidence_count,");
        csv.push_str("pre_documented_days,pre_coverage,pre_headache_rate,pre_intensity_mean,pre_acute_med_rate,");
        csv.push_str("post_documented_days,post_coverage,post_headache_rate,post_intensity_mean,post_acute_med_rate,");
        csv.push_str("headache_rate_delta,intensity_delta,acute_med_rate_delta,analysis_hash\n");

        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&self.metadata.drug_id),
                row.day,
                row.time.as_deref().unwrap_or(""),
                escape_csv(&row.source),
                row.confidence,
                row.evidence_count,
                row.pre_documented_days,
                row.pre_coverage,
                row.pre_headache_rate,
                optional(row.pre_intensity_mean),
                row.pre_acute_med_rate,
                row.post_documented_days,
                row.post_coverage,
                row.post_headache_rate,
                optional(row.post_intensity_mean),
                row.post_acute_med_rate,
                row.headache_rate_delta,
                optional(row.intensity_delta),
                row.acute_med_rate_delta,
                self.metadata.analysis_hash,
            ));
        }

        csv
    }
}

/// SHA-256 over the analysis' JSON encoding, hex encoded.
pub fn analysis_hash(analysis: &ProphylaxisAnalysis) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(analysis)?;
    Ok(hash_data(json.as_bytes()))
}

fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
