//! Greedy clustering of evidence into dose events.

use std::cmp::Ordering;

use crate::models::{ConfidenceBand, DoseEvent, DoseEvidence, EvidenceSourceKind};

/// Evidence within this many days of a cluster seed belongs to the same dose.
pub const CLUSTER_RADIUS_DAYS: i64 = 2;

/// Sort by day, then score descending, then source rank.
fn evidence_order(a: &DoseEvidence, b: &DoseEvidence) -> Ordering {
    a.day
        .cmp(&b.day)
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| a.source.rank().cmp(&b.source.rank()))
}

/// Whether `a` outranks `b`: higher score, ties to the better source.
fn outranks(a: &DoseEvidence, b: &DoseEvidence) -> bool {
    a.score > b.score || (a.score == b.score && a.source.rank() < b.source.rank())
}

/// Single pass over day-sorted evidence. Each unclustered item seeds a cluster
/// and absorbs every unclustered item within [`CLUSTER_RADIUS_DAYS`] of it.
pub fn cluster_evidence(mut evidence: Vec<DoseEvidence>) -> Vec<Vec<DoseEvidence>> {
    evidence.sort_by(evidence_order);

    let days: Vec<_> = evidence.iter().map(|e| e.day).collect();
    let mut slots: Vec<Option<DoseEvidence>> = evidence.into_iter().map(Some).collect();
    let mut clusters = Vec::new();

    for seed in 0..slots.len() {
        let Some(first) = slots[seed].take() else {
            continue;
        };
        let mut members = vec![first];
        for other in (seed + 1)..slots.len() {
            if slots[other].is_some() && days[seed].days_until(days[other]).abs() <= CLUSTER_RADIUS_DAYS {
                members.extend(slots[other].take());
            }
        }
        clusters.push(members);
    }

    clusters
}

/// The strongest evidence in a set.
pub fn best_evidence(evidence: &[DoseEvidence]) -> Option<&DoseEvidence> {
    evidence.iter().fold(None, |best, candidate| match best {
        Some(current) if !outranks(candidate, current) => Some(current),
        _ => Some(candidate),
    })
}

/// Turn one cluster into a dose event.
///
/// The event day comes from explicit documentation when any exists, regardless
/// of score; otherwise from the strongest evidence.
pub fn event_from_cluster(drug_id: &str, evidence: Vec<DoseEvidence>) -> Option<DoseEvent> {
    let best = best_evidence(&evidence)?;
    let explicit: Vec<DoseEvidence> = evidence
        .iter()
        .filter(|e| e.source == EvidenceSourceKind::ExplicitRecord)
        .cloned()
        .collect();
    let canonical = best_evidence(&explicit).unwrap_or(best);

    let day = canonical.day;
    let time_label = canonical.time_label.clone();
    let confidence = ConfidenceBand::from_score(best.score);
    let dominant_source = best.source;

    Some(DoseEvent {
        drug_id: drug_id.to_string(),
        day,
        time_label,
        confidence,
        dominant_source,
        evidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DayKey;

    fn ev(source: EvidenceSourceKind, key: &str, score: i32) -> DoseEvidence {
        DoseEvidence {
            source,
            record_id: None,
            timestamp: None,
            day: DayKey::parse(key).unwrap(),
            time_label: None,
            score,
            annotation: None,
        }
    }

    #[test]
    fn test_nearby_evidence_clusters() {
        let clusters = cluster_evidence(vec![
            ev(EvidenceSourceKind::ScheduledReminder, "2024-03-03", 60),
            ev(EvidenceSourceKind::ExplicitRecord, "2024-03-01", 100),
            ev(EvidenceSourceKind::CompletedReminder, "2024-03-30", 90),
        ]);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[1].len(), 1);
    }

    #[test]
    fn test_distance_measured_from_seed() {
        // 03-01 seeds; 03-03 joins; 03-05 is 4 days from the seed and starts a new cluster
        let clusters = cluster_evidence(vec![
            ev(EvidenceSourceKind::FreeTextMention, "2024-03-01", 60),
            ev(EvidenceSourceKind::FreeTextMention, "2024-03-03", 60),
            ev(EvidenceSourceKind::FreeTextMention, "2024-03-05", 60),
        ]);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn test_explicit_day_wins() {
        let cluster = vec![
            ev(EvidenceSourceKind::CompletedReminder, "2024-03-02", 115),
            ev(EvidenceSourceKind::ExplicitRecord, "2024-03-03", 100),
        ];
        let event = event_from_cluster("erenumab", cluster).unwrap();

        assert_eq!(event.day.to_string(), "2024-03-03");
        assert_eq!(event.dominant_source, EvidenceSourceKind::CompletedReminder);
        assert_eq!(event.confidence, ConfidenceBand::Certain);
    }

    #[test]
    fn test_tie_broken_by_rank() {
        let cluster = vec![
            ev(EvidenceSourceKind::ScheduledReminder, "2024-03-01", 60),
            ev(EvidenceSourceKind::FreeTextMention, "2024-03-02", 60),
        ];
        let event = event_from_cluster("erenumab", cluster).unwrap();
        assert_eq!(event.dominant_source, EvidenceSourceKind::FreeTextMention);
        assert_eq!(event.day.to_string(), "2024-03-02");
        assert_eq!(event.confidence, ConfidenceBand::Moderate);
    }

    #[test]
    fn test_empty_cluster_has_no_event() {
        assert!(event_from_cluster("erenumab", Vec::new()).is_none());
        assert!(cluster_evidence(Vec::new()).is_empty());
    }
}
