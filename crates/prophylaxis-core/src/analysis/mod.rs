//! Prophylaxis efficacy analysis.
//!
//! Pipeline: Adapt → Resolve dose events → Day features → Pre/post windows → Aggregate

mod day_features;
mod window;

pub use day_features::*;
pub use window::*;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::adapter::adapt_records;
use crate::calendar::{CalendarError, DayRange};
use crate::config::{AnalysisConfig, ConfigError};
use crate::models::{EvidenceSummary, ProphylaxisAnalysis, RecordBundle};
use crate::registry::DrugRegistry;
use crate::resolver::EvidenceResolver;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Runs the full analysis for one drug over one date range.
pub struct ProphylaxisAnalyzer<'a> {
    registry: &'a DrugRegistry,
    config: AnalysisConfig,
}

impl<'a> ProphylaxisAnalyzer<'a> {
    pub fn new(registry: &'a DrugRegistry) -> Self {
        Self {
            registry,
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a drug's dosing against the headache diary.
    ///
    /// Unknown drug ids still run against a fallback profile that matches the
    /// id itself. `now` is only used for plausibility and "not yet due" checks,
    /// so the same inputs always give the same result.
    pub fn analyze(
        &self,
        drug_id: &str,
        bundle: &RecordBundle,
        range: DayRange,
        now: DateTime<Utc>,
    ) -> AnalysisResult<ProphylaxisAnalysis> {
        self.config.validate()?;

        let profile = self.registry.profile_or_fallback(drug_id);
        let records = adapt_records(bundle)?;

        let events = EvidenceResolver::new(&profile, now).resolve(&records, &range);

        // Windows around doses near the edges reach outside the range
        let feature_range =
            range.widened(self.config.pre_window_days, self.config.post_window_days)?;
        let features = build_day_features(&bundle.diary, &feature_range)?;

        let comparisons = events
            .iter()
            .map(|event| compare_dose(event, &features, &self.config))
            .collect::<Result<Vec<_>, _>>()?;
        let aggregate = aggregate_comparisons(&comparisons);
        let evidence_summary = EvidenceSummary::from_events(&events);

        debug!(
            drug = %profile.id,
            feature_days = features.len(),
            comparisons = comparisons.len(),
            "Computed dose windows"
        );
        info!(
            drug = %profile.id,
            start = %range.start,
            end = %range.end,
            events = events.len(),
            "Prophylaxis analysis complete"
        );

        Ok(ProphylaxisAnalysis {
            drug_id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            typical_interval_days: profile.typical_interval_days,
            range,
            config: self.config,
            events,
            comparisons,
            aggregate,
            evidence_summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceBand, DiaryRow, IntakeRow};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap()
    }

    fn diary(date: &str, pain: &str, meds: &[&str]) -> DiaryRow {
        DiaryRow {
            id: format!("d-{}", date),
            medications: Some(meds.iter().map(|m| m.to_string()).collect()),
            date: Some(date.into()),
            pain_level: pain.into(),
            ..Default::default()
        }
    }

    fn intake(id: &str, date: &str, name: &str) -> IntakeRow {
        IntakeRow {
            id: id.into(),
            medication_name: name.into(),
            date: Some(date.into()),
            taken_at: None,
        }
    }

    #[test]
    fn test_analyze_single_dose() {
        let registry = DrugRegistry::new();
        let analyzer = ProphylaxisAnalyzer::new(&registry)
            .with_config(AnalysisConfig::default().with_pre_window_days(3).with_post_window_days(3));

        let bundle = RecordBundle {
            diary: vec![
                diary("2024-03-07", "6", &["Ibuprofen"]),
                diary("2024-03-08", "7", &["Sumatriptan"]),
                diary("2024-03-09", "5", &[]),
                diary("2024-03-11", "keine", &[]),
                diary("2024-03-12", "2", &[]),
                diary("2024-03-13", "keine", &[]),
            ],
            intakes: vec![intake("i1", "2024-03-10", "Aimovig 140mg")],
            ..Default::default()
        };

        let range = DayRange::parse("2024-03-10", "2024-03-31").unwrap();
        let analysis = analyzer.analyze("erenumab", &bundle, range, now()).unwrap();

        assert_eq!(analysis.display_name, "Erenumab (Aimovig)");
        assert_eq!(analysis.events.len(), 1);
        assert_eq!(analysis.events[0].confidence, ConfidenceBand::Certain);

        // Pre window lies before the range start and is still analyzed
        let comparison = &analysis.comparisons[0];
        assert_eq!(comparison.pre.documented_days, 3);
        assert_eq!(comparison.pre.headache_rate, 1.0);
        assert_eq!(comparison.post.headache_rate, 0.33);
        assert_eq!(comparison.headache_rate_delta, -0.67);

        let aggregate = analysis.aggregate.unwrap();
        assert_eq!(aggregate.comparison_count, 1);
        assert_eq!(aggregate.coverage_floor(), 1.0);
        assert_eq!(analysis.evidence_summary.event_count, 1);
    }

    #[test]
    fn test_no_evidence_is_empty_analysis() {
        let registry = DrugRegistry::new();
        let analyzer = ProphylaxisAnalyzer::new(&registry);
        let bundle = RecordBundle {
            diary: vec![diary("2024-03-07", "6", &["Ibuprofen"])],
            ..Default::default()
        };
        let range = DayRange::parse("2024-03-01", "2024-03-31").unwrap();

        let analysis = analyzer.analyze("fremanezumab", &bundle, range, now()).unwrap();
        assert!(analysis.events.is_empty());
        assert!(analysis.comparisons.is_empty());
        assert!(analysis.aggregate.is_none());
        assert!(analysis.evidence_summary.best_confidence.is_none());
    }

    #[test]
    fn test_unknown_drug_uses_fallback_profile() {
        let registry = DrugRegistry::new();
        let analyzer = ProphylaxisAnalyzer::new(&registry);
        let bundle = RecordBundle {
            intakes: vec![intake("i1", "2024-03-05", "Propranolol")],
            ..Default::default()
        };
        let range = DayRange::parse("2024-03-01", "2024-03-31").unwrap();

        let analysis = analyzer.analyze("propranolol", &bundle, range, now()).unwrap();
        assert_eq!(analysis.drug_id, "propranolol");
        assert_eq!(analysis.events.len(), 1);
        assert!(analysis.typical_interval_days.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let registry = DrugRegistry::new();
        let analyzer = ProphylaxisAnalyzer::new(&registry)
            .with_config(AnalysisConfig::default().with_post_window_days(0));
        let range = DayRange::parse("2024-03-01", "2024-03-31").unwrap();

        let result = analyzer.analyze("erenumab", &RecordBundle::default(), range, now());
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let registry = DrugRegistry::new();
        let analyzer = ProphylaxisAnalyzer::new(&registry);
        let bundle = RecordBundle {
            diary: vec![diary("2024-03-04", "5", &["Ibuprofen"])],
            intakes: vec![intake("i1", "2024-03-05", "Ajovy")],
            ..Default::default()
        };
        let range = DayRange::parse("2024-03-01", "2024-03-31").unwrap();

        let first = analyzer.analyze("fremanezumab", &bundle, range, now()).unwrap();
        let second = analyzer.analyze("fremanezumab", &bundle, range, now()).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
