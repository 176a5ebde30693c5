//! Dose evidence, confidence bands and resolved dose events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar::DayKey;

/// Where a piece of dose evidence came from, best first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSourceKind {
    /// Diary or intake record naming the drug
    ExplicitRecord,
    /// Reminder for the drug marked as done
    CompletedReminder,
    /// Drug named in diary free text
    FreeTextMention,
    /// Reminder scheduled but never completed
    ScheduledReminder,
    /// Reserved for interval-based inference
    PatternInferred,
}

impl EvidenceSourceKind {
    pub const ALL: [EvidenceSourceKind; 5] = [
        EvidenceSourceKind::ExplicitRecord,
        EvidenceSourceKind::CompletedReminder,
        EvidenceSourceKind::FreeTextMention,
        EvidenceSourceKind::ScheduledReminder,
        EvidenceSourceKind::PatternInferred,
    ];

    /// Position in the ranking; 0 is strongest.
    pub fn rank(self) -> u8 {
        match self {
            EvidenceSourceKind::ExplicitRecord => 0,
            EvidenceSourceKind::CompletedReminder => 1,
            EvidenceSourceKind::FreeTextMention => 2,
            EvidenceSourceKind::ScheduledReminder => 3,
            EvidenceSourceKind::PatternInferred => 4,
        }
    }

    /// Score before timestamp and timing modifiers.
    pub fn base_score(self) -> i32 {
        match self {
            EvidenceSourceKind::ExplicitRecord => 100,
            EvidenceSourceKind::CompletedReminder => 70,
            EvidenceSourceKind::FreeTextMention => 60,
            EvidenceSourceKind::ScheduledReminder => 50,
            EvidenceSourceKind::PatternInferred => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EvidenceSourceKind::ExplicitRecord => "explicit diary/intake record",
            EvidenceSourceKind::CompletedReminder => "completed reminder",
            EvidenceSourceKind::FreeTextMention => "free-text diary mention",
            EvidenceSourceKind::ScheduledReminder => "scheduled reminder (not confirmed)",
            EvidenceSourceKind::PatternInferred => "inferred from dosing pattern",
        }
    }
}

/// Resolution certainty. Only these six values exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceBand {
    Low,
    Guarded,
    Moderate,
    High,
    VeryHigh,
    Certain,
}

impl ConfidenceBand {
    pub const ALL: [ConfidenceBand; 6] = [
        ConfidenceBand::Certain,
        ConfidenceBand::VeryHigh,
        ConfidenceBand::High,
        ConfidenceBand::Moderate,
        ConfidenceBand::Guarded,
        ConfidenceBand::Low,
    ];

    /// The only way to derive a band: from a cluster's maximum evidence score.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 95 => ConfidenceBand::Certain,
            s if s >= 85 => ConfidenceBand::VeryHigh,
            s if s >= 75 => ConfidenceBand::High,
            s if s >= 60 => ConfidenceBand::Moderate,
            s if s >= 50 => ConfidenceBand::Guarded,
            _ => ConfidenceBand::Low,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            ConfidenceBand::Certain => 1.0,
            ConfidenceBand::VeryHigh => 0.9,
            ConfidenceBand::High => 0.8,
            ConfidenceBand::Moderate => 0.6,
            ConfidenceBand::Guarded => 0.5,
            ConfidenceBand::Low => 0.4,
        }
    }

    pub fn percent(self) -> u32 {
        match self {
            ConfidenceBand::Certain => 100,
            ConfidenceBand::VeryHigh => 90,
            ConfidenceBand::High => 80,
            ConfidenceBand::Moderate => 60,
            ConfidenceBand::Guarded => 50,
            ConfidenceBand::Low => 40,
        }
    }

    /// Look up the band with exactly this numeric value.
    pub fn from_value(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|band| (band.value() - value).abs() < 1e-9)
    }
}

impl Serialize for ConfidenceBand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

impl<'de> Deserialize<'de> for ConfidenceBand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        ConfidenceBand::from_value(value).ok_or_else(|| {
            serde::de::Error::custom(format!("{} is not a confidence band", value))
        })
    }
}

/// One scored observation suggesting a dose happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseEvidence {
    pub source: EvidenceSourceKind,
    /// ID of the raw record this came from
    pub record_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub day: DayKey,
    /// Berlin `HH:mm` label, when known
    pub time_label: Option<String>,
    pub score: i32,
    pub annotation: Option<String>,
}

/// A resolved, deduplicated administration of a prophylactic drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseEvent {
    pub drug_id: String,
    pub day: DayKey,
    pub time_label: Option<String>,
    pub confidence: ConfidenceBand,
    pub dominant_source: EvidenceSourceKind,
    /// All evidence merged into this event
    pub evidence: Vec<DoseEvidence>,
}
