//! Natural-language efficacy report.
//!
//! The generator never claims causation and never alarms on weak evidence:
//! firm directional statements need sufficient diary coverage and dose-date
//! confidence, and below that only improvements are mentioned, hedged.

use serde::{Deserialize, Serialize};

use super::phrases;
use crate::calendar::DayKey;
use crate::models::{AggregateDeltas, ConfidenceBand, DoseComparison, ProphylaxisAnalysis};

/// Minimum average coverage for a firm statement.
pub const MIN_COVERAGE: f64 = 0.5;

/// Minimum best dose-date confidence for a firm statement.
pub const MIN_CONFIDENCE: ConfidenceBand = ConfidenceBand::Moderate;

/// Weakest confidence that triggers the schedule-estimated warning.
pub const ESTIMATED_CONFIDENCE: ConfidenceBand = ConfidenceBand::Moderate;

/// Deltas at or below this magnitude count as no change.
pub const CHANGE_THRESHOLD: f64 = 0.05;

/// Structured report text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportText {
    pub title: String,
    pub paragraphs: Vec<String>,
    pub warnings: Vec<String>,
    /// One line per dose event, in date order
    pub event_summaries: Vec<String>,
}

/// Outcome metrics; for all of them lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    HeadacheRate,
    Intensity,
    AcuteMedicationRate,
}

impl Metric {
    const ALL: [Metric; 3] = [
        Metric::HeadacheRate,
        Metric::Intensity,
        Metric::AcuteMedicationRate,
    ];

    fn label(self) -> &'static str {
        match self {
            Metric::HeadacheRate => "headache-day rate",
            Metric::Intensity => "mean headache intensity",
            Metric::AcuteMedicationRate => "rate of days with acute medication",
        }
    }

    fn delta(self, aggregate: &AggregateDeltas) -> Option<f64> {
        match self {
            Metric::HeadacheRate => Some(aggregate.mean_headache_rate_delta),
            Metric::Intensity => aggregate.mean_intensity_delta,
            Metric::AcuteMedicationRate => Some(aggregate.mean_acute_med_rate_delta),
        }
    }

    fn amount(self, delta: f64) -> String {
        match self {
            Metric::Intensity => phrases::intensity_points(delta),
            Metric::HeadacheRate | Metric::AcuteMedicationRate => phrases::percentage_points(delta),
        }
    }
}

/// Generate the report text for an analysis.
pub fn generate_report_text(analysis: &ProphylaxisAnalysis) -> ReportText {
    let start = analysis.range.start.to_string();
    let end = analysis.range.end.to_string();
    let title = phrases::report_title(&analysis.display_name, &start, &end);

    if analysis.events.is_empty() {
        return ReportText {
            title,
            paragraphs: vec![phrases::no_documented_doses(
                &analysis.display_name,
                &start,
                &end,
            )],
            warnings: Vec::new(),
            event_summaries: Vec::new(),
        };
    }

    let summary = &analysis.evidence_summary;
    let best = summary.best_confidence.unwrap_or(ConfidenceBand::Low);
    let worst = summary.worst_confidence.unwrap_or(ConfidenceBand::Low);
    let coverage = analysis
        .aggregate
        .as_ref()
        .map_or(0.0, AggregateDeltas::coverage_floor);

    let distribution = summary
        .source_distribution
        .iter()
        .map(|share| phrases::source_share(share.count, share.source.label()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut paragraphs = vec![phrases::evidence_overview(
        &analysis.display_name,
        summary.event_count,
        &distribution,
        &phrases::confidence_range(worst.percent(), best.percent()),
    )];

    let mut warnings = Vec::new();
    if worst <= ESTIMATED_CONFIDENCE {
        warnings.push(phrases::ESTIMATED_DOSES_WARNING.to_string());
    }
    if coverage < MIN_COVERAGE {
        warnings.push(phrases::LIMITED_EVIDENCE_WARNING.to_string());
    }

    if let Some(aggregate) = &analysis.aggregate {
        let firm = coverage >= MIN_COVERAGE && best >= MIN_CONFIDENCE;
        paragraphs.extend(
            Metric::ALL
                .into_iter()
                .filter_map(|metric| metric_statement(metric, aggregate, firm)),
        );
    }

    paragraphs.push(phrases::CORRELATION_DISCLAIMER.to_string());

    ReportText {
        title,
        paragraphs,
        warnings,
        event_summaries: event_summaries(analysis),
    }
}

fn metric_statement(metric: Metric, aggregate: &AggregateDeltas, firm: bool) -> Option<String> {
    let delta = metric.delta(aggregate)?;
    let improved = delta < 0.0;

    if firm {
        if delta.abs() > CHANGE_THRESHOLD {
            Some(phrases::clear_change(
                metric.label(),
                improved,
                &metric.amount(delta),
                aggregate.comparison_count,
            ))
        } else {
            Some(phrases::no_clear_change(metric.label()))
        }
    } else if improved && delta.abs() > CHANGE_THRESHOLD {
        Some(phrases::possible_improvement(metric.label(), &metric.amount(delta)))
    } else {
        None
    }
}

fn event_summaries(analysis: &ProphylaxisAnalysis) -> Vec<String> {
    let mut previous = None;
    analysis
        .comparisons
        .iter()
        .map(|comparison| {
            let line = event_summary(comparison, previous, analysis.typical_interval_days);
            previous = Some(comparison.event.day);
            line
        })
        .collect()
}

fn event_summary(
    comparison: &DoseComparison,
    previous: Option<DayKey>,
    typical_interval_days: Option<u32>,
) -> String {
    let event = &comparison.event;
    let mut line = phrases::event_line(
        &event.day.to_string(),
        event.time_label.as_deref(),
        event.dominant_source.label(),
        event.confidence.percent(),
        event.evidence.len(),
        &phrases::percent(comparison.pre.headache_rate),
        &phrases::percent(comparison.post.headache_rate),
    );
    if let Some(previous) = previous {
        line.push_str(", ");
        line.push_str(&phrases::dose_spacing(
            previous.days_until(event.day),
            typical_interval_days,
        ));
    }
    line
}
