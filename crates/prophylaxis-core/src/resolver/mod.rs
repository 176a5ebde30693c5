//! Evidence resolver for prophylactic dose events.
//!
//! Pipeline: Collection → Scoring → Clustering → Canonicalization

mod cluster;
mod collector;

pub use cluster::*;
pub use collector::*;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::calendar::DayRange;
use crate::models::{AdaptedRecords, DoseEvent, DoseEvidence};
use crate::registry::DrugProfile;

/// Main resolver that coordinates the full pipeline.
pub struct EvidenceResolver<'a> {
    profile: &'a DrugProfile,
    now: DateTime<Utc>,
}

impl<'a> EvidenceResolver<'a> {
    /// Create a resolver. `now` bounds "not yet due" and far-future checks.
    pub fn new(profile: &'a DrugProfile, now: DateTime<Utc>) -> Self {
        Self { profile, now }
    }

    /// Collect scored evidence for the drug within the range.
    pub fn collect_evidence(&self, records: &AdaptedRecords, range: &DayRange) -> Vec<DoseEvidence> {
        EvidenceCollector::new(self.profile, range, self.now).collect(records)
    }

    /// Resolve records into date-ordered dose events. No evidence yields no events.
    pub fn resolve(&self, records: &AdaptedRecords, range: &DayRange) -> Vec<DoseEvent> {
        let evidence = self.collect_evidence(records, range);
        self.resolve_evidence(evidence)
    }

    /// Cluster pre-collected evidence into dose events.
    pub fn resolve_evidence(&self, evidence: Vec<DoseEvidence>) -> Vec<DoseEvent> {
        if evidence.is_empty() {
            debug!(drug = %self.profile.id, "No dose evidence");
            return Vec::new();
        }

        let evidence_count = evidence.len();
        let fallback = best_evidence(&evidence).cloned();
        let clusters = cluster_evidence(evidence);
        let cluster_count = clusters.len();

        let mut events: Vec<DoseEvent> = clusters
            .into_iter()
            .filter_map(|members| event_from_cluster(&self.profile.id, members))
            .collect();

        // Anything documented must surface as at least one event
        if events.is_empty() {
            if let Some(best) = fallback {
                warn!(drug = %self.profile.id, "Clustering produced no events; using best evidence");
                events.extend(event_from_cluster(&self.profile.id, vec![best]));
            }
        }

        events.sort_by_key(|e| e.day);

        debug!(
            drug = %self.profile.id,
            evidence = evidence_count,
            clusters = cluster_count,
            events = events.len(),
            "Resolved dose events"
        );

        events
    }
}
