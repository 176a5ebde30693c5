//! Upstream record rows and their normalized evidence-source forms.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::DayKey;

/// A headache diary entry as persisted by the storage layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiaryRow {
    /// Storage ID
    pub id: String,
    /// Medications taken (free-form names)
    pub medications: Option<Vec<String>>,
    /// Explicit stored calendar date (`YYYY-MM-DD`)
    pub date: Option<String>,
    /// Time of day as entered (`HH:mm`)
    pub time: Option<String>,
    /// Creation timestamp (UTC)
    pub created_at: Option<DateTime<Utc>>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Pain descriptor: numeric string or severity word
    #[serde(default)]
    pub pain_level: String,
}

/// A standalone medication intake record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntakeRow {
    pub id: String,
    pub medication_name: String,
    pub date: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
}

/// A reminder as scheduled in the reminder store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderRow {
    pub id: String,
    pub title: String,
    pub medications: Option<Vec<String>>,
    /// Scheduled instant (UTC)
    pub scheduled_at: DateTime<Utc>,
    /// Type tag; only "medication" reminders carry dose evidence
    #[serde(rename = "type")]
    pub kind: String,
}

/// A reminder completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRow {
    pub reminder_id: String,
    pub completed_at: DateTime<Utc>,
}

/// Everything the storage layer hands over for one user and date range.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecordBundle {
    pub diary: Vec<DiaryRow>,
    pub intakes: Vec<IntakeRow>,
    pub reminders: Vec<ReminderRow>,
    pub completions: Vec<CompletionRow>,
}

/// Diary entry that names at least one medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiarySource {
    pub id: String,
    pub day: DayKey,
    /// Normalized `HH:mm` label, if the entry carried a usable one
    pub time: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub medications: Vec<String>,
}

/// Diary entry with non-blank notes, whether or not it lists medications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaryNote {
    pub id: String,
    pub day: DayKey,
    pub time: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntakeSource {
    pub id: String,
    pub day: DayKey,
    pub timestamp: Option<DateTime<Utc>>,
    pub medication: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderSource {
    pub id: String,
    pub title: String,
    pub medications: Vec<String>,
    pub scheduled_at: DateTime<Utc>,
    pub scheduled_day: DayKey,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionSource {
    pub reminder_id: String,
    pub completed_at: DateTime<Utc>,
    pub completed_day: DayKey,
}

/// The normalized collections the resolver consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdaptedRecords {
    pub diary: Vec<DiarySource>,
    pub diary_notes: Vec<DiaryNote>,
    pub intakes: Vec<IntakeSource>,
    pub reminders: Vec<ReminderSource>,
    pub completions: Vec<CompletionSource>,
    /// Days with any diary entry at all, symptom-free ones included
    pub activity_days: BTreeSet<DayKey>,
}
