//! Record adapter: upstream rows → normalized evidence sources.
//!
//! Pure shape conversion. Nothing here scores or filters by drug; rows that
//! cannot be placed on a calendar day are dropped, never defaulted to today.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::calendar::{normalize_time_label, CalendarResult, DayKey};
use crate::models::{
    AdaptedRecords, CompletionRow, CompletionSource, DiaryNote, DiaryRow, DiarySource, IntakeRow,
    IntakeSource, RecordBundle, ReminderRow, ReminderSource,
};

/// Reminder type tag that carries dose evidence.
const MEDICATION_REMINDER_KIND: &str = "medication";

/// Adapt every collection in a bundle.
pub fn adapt_records(bundle: &RecordBundle) -> CalendarResult<AdaptedRecords> {
    let adapted = AdaptedRecords {
        diary: adapt_diary_rows(&bundle.diary)?,
        diary_notes: adapt_diary_notes(&bundle.diary)?,
        intakes: adapt_intake_rows(&bundle.intakes)?,
        reminders: adapt_reminder_rows(&bundle.reminders),
        completions: adapt_completion_rows(&bundle.completions),
        activity_days: diary_activity_days(&bundle.diary)?,
    };

    debug!(
        diary_in = bundle.diary.len(),
        diary_out = adapted.diary.len(),
        notes_out = adapted.diary_notes.len(),
        activity_days = adapted.activity_days.len(),
        intakes_in = bundle.intakes.len(),
        intakes_out = adapted.intakes.len(),
        reminders_in = bundle.reminders.len(),
        reminders_out = adapted.reminders.len(),
        completions = adapted.completions.len(),
        "Adapted record bundle"
    );

    Ok(adapted)
}

/// Resolve a day: an explicit stored date wins over a timestamp.
///
/// A stored date that is present but malformed is an error, not a fallback.
pub fn resolve_day(
    stored_date: Option<&str>,
    timestamp: Option<&DateTime<Utc>>,
) -> CalendarResult<Option<DayKey>> {
    match stored_date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => DayKey::parse(date).map(Some),
        None => Ok(timestamp.map(DayKey::from_utc)),
    }
}

pub fn resolve_diary_day(row: &DiaryRow) -> CalendarResult<Option<DayKey>> {
    resolve_day(row.date.as_deref(), row.created_at.as_ref())
}

/// Trimmed, non-blank medication names of a diary row.
pub fn diary_medications(row: &DiaryRow) -> Vec<String> {
    row.medications
        .iter()
        .flatten()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn adapt_diary_rows(rows: &[DiaryRow]) -> CalendarResult<Vec<DiarySource>> {
    let mut sources = Vec::new();
    for row in rows {
        let medications = diary_medications(row);
        if medications.is_empty() {
            continue;
        }
        let Some(day) = resolve_diary_day(row)? else {
            continue;
        };
        sources.push(DiarySource {
            id: row.id.clone(),
            day,
            time: row.time.as_deref().and_then(normalize_time_label),
            timestamp: row.created_at,
            medications,
        });
    }
    Ok(sources)
}

/// Every diary row with non-blank notes, medication list or not.
pub fn adapt_diary_notes(rows: &[DiaryRow]) -> CalendarResult<Vec<DiaryNote>> {
    let mut notes = Vec::new();
    for row in rows {
        let Some(text) = row.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };
        let Some(day) = resolve_diary_day(row)? else {
            continue;
        };
        notes.push(DiaryNote {
            id: row.id.clone(),
            day,
            time: row.time.as_deref().and_then(normalize_time_label),
            timestamp: row.created_at,
            notes: text.to_string(),
        });
    }
    Ok(notes)
}

/// Days carrying any diary entry, including symptom-free ones.
pub fn diary_activity_days(rows: &[DiaryRow]) -> CalendarResult<BTreeSet<DayKey>> {
    let mut days = BTreeSet::new();
    for row in rows {
        if let Some(day) = resolve_diary_day(row)? {
            days.insert(day);
        }
    }
    Ok(days)
}

pub fn adapt_intake_rows(rows: &[IntakeRow]) -> CalendarResult<Vec<IntakeSource>> {
    let mut sources = Vec::new();
    for row in rows {
        let medication = row.medication_name.trim();
        if medication.is_empty() {
            continue;
        }
        let Some(day) = resolve_day(row.date.as_deref(), row.taken_at.as_ref())? else {
            continue;
        };
        sources.push(IntakeSource {
            id: row.id.clone(),
            day,
            timestamp: row.taken_at,
            medication: medication.to_string(),
        });
    }
    Ok(sources)
}

pub fn adapt_reminder_rows(rows: &[ReminderRow]) -> Vec<ReminderSource> {
    rows.iter()
        .filter(|row| row.kind.trim().eq_ignore_ascii_case(MEDICATION_REMINDER_KIND))
        .map(|row| ReminderSource {
            id: row.id.clone(),
            title: row.title.clone(),
            medications: row
                .medications
                .iter()
                .flatten()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            scheduled_at: row.scheduled_at,
            scheduled_day: DayKey::from_utc(&row.scheduled_at),
        })
        .collect()
}

pub fn adapt_completion_rows(rows: &[CompletionRow]) -> Vec<CompletionSource> {
    rows.iter()
        .map(|row| CompletionSource {
            reminder_id: row.reminder_id.clone(),
            completed_at: row.completed_at,
            completed_day: DayKey::from_utc(&row.completed_at),
        })
        .collect()
}
