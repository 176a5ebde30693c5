//! Day features, window statistics and the aggregate analysis result.

use serde::{Deserialize, Serialize};

use super::evidence::{ConfidenceBand, DoseEvent, EvidenceSourceKind};
use crate::calendar::DayRange;
use crate::config::AnalysisConfig;

/// One calendar day's clinical summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DayFeature {
    /// Any diary entry exists for the day, including symptom-free ones
    pub documented: bool,
    pub had_headache: bool,
    /// Worst pain on a 0-10 scale
    pub worst_pain: Option<f64>,
    /// Any non-prophylactic medication was taken
    pub acute_medication: bool,
    pub acute_medication_count: u32,
}

impl DayFeature {
    /// Combine two records for the same day. Max pain wins, flags OR, counts add.
    pub fn merged(&self, other: &DayFeature) -> DayFeature {
        let worst_pain = match (self.worst_pain, other.worst_pain) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        DayFeature {
            documented: self.documented || other.documented,
            had_headache: self.had_headache || other.had_headache,
            worst_pain,
            acute_medication: self.acute_medication || other.acute_medication,
            acute_medication_count: self.acute_medication_count + other.acute_medication_count,
        }
    }
}

/// Aggregate over a range of days around a dose.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WindowStats {
    /// Nominal window length in days
    pub window_days: u32,
    pub documented_days: u32,
    /// documented_days / window_days
    pub coverage: f64,
    pub headache_days: u32,
    /// headache_days / documented_days
    pub headache_rate: f64,
    pub intensity_mean: Option<f64>,
    pub intensity_median: Option<f64>,
    pub intensity_max: Option<f64>,
    pub acute_med_days: u32,
    /// acute_med_days / documented_days
    pub acute_med_rate: f64,
    pub acute_med_total: u32,
    /// Days with pain >= 7
    pub severe_days: u32,
}

/// A dose event with the windows around it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseComparison {
    pub event: DoseEvent,
    pub pre: WindowStats,
    pub post: WindowStats,
    /// post - pre
    pub headache_rate_delta: f64,
    pub intensity_delta: Option<f64>,
    pub acute_med_rate_delta: f64,
}

/// Mean deltas across all comparisons.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateDeltas {
    pub comparison_count: u32,
    pub mean_headache_rate_delta: f64,
    /// Mean over comparisons that had intensity on both sides
    pub mean_intensity_delta: Option<f64>,
    pub mean_acute_med_rate_delta: f64,
    pub mean_pre_coverage: f64,
    pub mean_post_coverage: f64,
}

impl AggregateDeltas {
    /// The weaker of the two average coverages.
    pub fn coverage_floor(&self) -> f64 {
        self.mean_pre_coverage.min(self.mean_post_coverage)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceCount {
    pub source: EvidenceSourceKind,
    pub count: u32,
}

/// How the dose events were established.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvidenceSummary {
    pub event_count: u32,
    /// Dominant-source counts in rank order, zero counts omitted
    pub source_distribution: Vec<SourceCount>,
    pub best_confidence: Option<ConfidenceBand>,
    pub worst_confidence: Option<ConfidenceBand>,
}

impl EvidenceSummary {
    pub fn from_events(events: &[DoseEvent]) -> Self {
        let source_distribution = EvidenceSourceKind::ALL
            .into_iter()
            .filter_map(|source| {
                let count = events.iter().filter(|e| e.dominant_source == source).count() as u32;
                (count > 0).then_some(SourceCount { source, count })
            })
            .collect();

        Self {
            event_count: events.len() as u32,
            source_distribution,
            best_confidence: events.iter().map(|e| e.confidence).max(),
            worst_confidence: events.iter().map(|e| e.confidence).min(),
        }
    }
}

/// Complete result for one drug over one date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProphylaxisAnalysis {
    pub drug_id: String,
    pub display_name: String,
    /// Typical dosing interval, informational
    pub typical_interval_days: Option<u32>,
    pub range: DayRange,
    pub config: AnalysisConfig,
    pub events: Vec<DoseEvent>,
    pub comparisons: Vec<DoseComparison>,
    pub aggregate: Option<AggregateDeltas>,
    pub evidence_summary: EvidenceSummary,
}
