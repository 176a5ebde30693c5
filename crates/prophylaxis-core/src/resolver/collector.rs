//! Evidence collection with source-based scoring.
//!
//! Scoring:
//! - Base score by source kind (explicit 100, completed 70, free text 60, scheduled 50)
//! - Plausible timestamp: +10
//! - Completion timing: +10 within 24h of schedule, -15 beyond 72h
//! - Completion on a day with diary activity: +5
//! - Free text without an administration verb nearby: -20

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::calendar::{berlin_time_label, DayKey, DayRange};
use crate::models::{
    AdaptedRecords, CompletionSource, DiaryNote, DiarySource, DoseEvidence,
    EvidenceSourceKind, IntakeSource, ReminderSource,
};
use crate::registry::{DrugProfile, MentionContext};

/// Timestamps before 2000-01-01T00:00:00Z are treated as placeholders.
const PLACEHOLDER_EPOCH_FLOOR_SECS: i64 = 946_684_800;

/// Timestamps further than this past "now" are treated as placeholders.
const FAR_FUTURE_DAYS: i64 = 365;

const TIMESTAMP_BONUS: i32 = 10;
const ON_TIME_COMPLETION_BONUS: i32 = 10;
const LATE_COMPLETION_PENALTY: i32 = 15;
const DIARY_ACTIVITY_BONUS: i32 = 5;
const NO_CONTEXT_PENALTY: i32 = 20;

/// Completion within this many minutes of schedule counts as on time.
const ON_TIME_WINDOW_MINUTES: i64 = 24 * 60;

/// Completion further than this many minutes from schedule is penalized.
const LATE_WINDOW_MINUTES: i64 = 72 * 60;

/// Collects scored evidence for one drug.
pub struct EvidenceCollector<'a> {
    profile: &'a DrugProfile,
    range: &'a DayRange,
    now: DateTime<Utc>,
}

impl<'a> EvidenceCollector<'a> {
    pub fn new(profile: &'a DrugProfile, range: &'a DayRange, now: DateTime<Utc>) -> Self {
        Self { profile, range, now }
    }

    /// Gather evidence from every source, in source-rank order.
    pub fn collect(&self, records: &AdaptedRecords) -> Vec<DoseEvidence> {
        let mut evidence = Vec::new();

        for entry in &records.diary {
            evidence.extend(self.from_diary_entry(entry));
        }
        for intake in &records.intakes {
            evidence.extend(self.from_intake(intake));
        }
        let explicit_days: BTreeSet<DayKey> = evidence.iter().map(|e| e.day).collect();

        let reminders: BTreeMap<&str, &ReminderSource> = records
            .reminders
            .iter()
            .filter(|r| self.reminder_matches(r))
            .map(|r| (r.id.as_str(), r))
            .collect();
        let completed_ids: BTreeSet<&str> = records
            .completions
            .iter()
            .map(|c| c.reminder_id.as_str())
            .collect();

        for completion in &records.completions {
            if let Some(reminder) = reminders.get(completion.reminder_id.as_str()) {
                evidence.extend(self.from_completion(completion, reminder, &records.activity_days));
            }
        }

        for reminder in reminders.values() {
            if !completed_ids.contains(reminder.id.as_str()) {
                evidence.extend(self.from_scheduled(reminder));
            }
        }

        for note in &records.diary_notes {
            if !explicit_days.contains(&note.day) {
                evidence.extend(self.from_free_text(note));
            }
        }

        evidence
    }

    fn from_diary_entry(&self, entry: &DiarySource) -> Option<DoseEvidence> {
        if !self.range.contains(entry.day) {
            return None;
        }
        let medication = entry.medications.iter().find(|m| self.profile.matches_name(m))?;
        let source = EvidenceSourceKind::ExplicitRecord;
        Some(DoseEvidence {
            source,
            record_id: Some(entry.id.clone()),
            timestamp: entry.timestamp,
            day: entry.day,
            time_label: self.time_label(entry.timestamp.as_ref()).or_else(|| entry.time.clone()),
            score: source.base_score() + self.timestamp_bonus(entry.timestamp.as_ref()),
            annotation: Some(format!("diary: {}", medication)),
        })
    }

    fn from_intake(&self, intake: &IntakeSource) -> Option<DoseEvidence> {
        if !self.range.contains(intake.day) || !self.profile.matches_name(&intake.medication) {
            return None;
        }
        let source = EvidenceSourceKind::ExplicitRecord;
        Some(DoseEvidence {
            source,
            record_id: Some(intake.id.clone()),
            timestamp: intake.timestamp,
            day: intake.day,
            time_label: self.time_label(intake.timestamp.as_ref()),
            score: source.base_score() + self.timestamp_bonus(intake.timestamp.as_ref()),
            annotation: Some(format!("intake: {}", intake.medication)),
        })
    }

    fn from_completion(
        &self,
        completion: &CompletionSource,
        reminder: &ReminderSource,
        activity_days: &BTreeSet<DayKey>,
    ) -> Option<DoseEvidence> {
        if !self.range.contains(completion.completed_day) {
            return None;
        }
        let source = EvidenceSourceKind::CompletedReminder;
        let offset_minutes = (completion.completed_at - reminder.scheduled_at)
            .num_minutes()
            .abs();

        let mut score = source.base_score() + self.timestamp_bonus(Some(&completion.completed_at));
        if offset_minutes <= ON_TIME_WINDOW_MINUTES {
            score += ON_TIME_COMPLETION_BONUS;
        } else if offset_minutes > LATE_WINDOW_MINUTES {
            score -= LATE_COMPLETION_PENALTY;
        }
        if activity_days.contains(&completion.completed_day) {
            score += DIARY_ACTIVITY_BONUS;
        }

        Some(DoseEvidence {
            source,
            record_id: Some(reminder.id.clone()),
            timestamp: Some(completion.completed_at),
            day: completion.completed_day,
            time_label: self.time_label(Some(&completion.completed_at)),
            score,
            annotation: Some(format!(
                "reminder \"{}\" completed {}h after schedule",
                reminder.title,
                (completion.completed_at - reminder.scheduled_at).num_hours()
            )),
        })
    }

    fn from_scheduled(&self, reminder: &ReminderSource) -> Option<DoseEvidence> {
        // Not yet due
        if reminder.scheduled_at > self.now || !self.range.contains(reminder.scheduled_day) {
            return None;
        }
        let source = EvidenceSourceKind::ScheduledReminder;
        Some(DoseEvidence {
            source,
            record_id: Some(reminder.id.clone()),
            timestamp: Some(reminder.scheduled_at),
            day: reminder.scheduled_day,
            time_label: self.time_label(Some(&reminder.scheduled_at)),
            score: source.base_score() + self.timestamp_bonus(Some(&reminder.scheduled_at)),
            annotation: Some(format!("reminder \"{}\" scheduled, not completed", reminder.title)),
        })
    }

    fn from_free_text(&self, entry: &DiaryNote) -> Option<DoseEvidence> {
        if !self.range.contains(entry.day) {
            return None;
        }
        let context = self.profile.mention_context(&entry.notes)?;

        let source = EvidenceSourceKind::FreeTextMention;
        let mut score = source.base_score() + self.timestamp_bonus(entry.timestamp.as_ref());
        if context != MentionContext::Administration {
            score -= NO_CONTEXT_PENALTY;
        }

        Some(DoseEvidence {
            source,
            record_id: Some(entry.id.clone()),
            timestamp: entry.timestamp,
            day: entry.day,
            time_label: self.time_label(entry.timestamp.as_ref()).or_else(|| entry.time.clone()),
            score,
            annotation: Some(format!("note mention ({:?})", context).to_lowercase()),
        })
    }

    fn reminder_matches(&self, reminder: &ReminderSource) -> bool {
        self.profile.matches_any(&reminder.medications) || self.profile.matches_name(&reminder.title)
    }

    /// Whether a timestamp looks like a real recording time.
    pub fn is_plausible_timestamp(&self, timestamp: &DateTime<Utc>) -> bool {
        timestamp.timestamp() >= PLACEHOLDER_EPOCH_FLOOR_SECS
            && (*timestamp - self.now).num_days() <= FAR_FUTURE_DAYS
    }

    fn timestamp_bonus(&self, timestamp: Option<&DateTime<Utc>>) -> i32 {
        match timestamp {
            Some(ts) if self.is_plausible_timestamp(ts) => TIMESTAMP_BONUS,
            _ => 0,
        }
    }

    fn time_label(&self, timestamp: Option<&DateTime<Utc>>) -> Option<String> {
        timestamp
            .filter(|ts| self.is_plausible_timestamp(ts))
            .map(berlin_time_label)
    }
}
