//! Per-day clinical features from diary entries.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::adapter::{diary_medications, resolve_diary_day};
use crate::calendar::{CalendarResult, DayKey, DayRange};
use crate::models::{DayFeature, DiaryRow};
use crate::registry::is_prophylactic_medication;

/// Day features keyed by Berlin day.
pub type DayFeatureMap = BTreeMap<DayKey, DayFeature>;

/// Pain at or above this level counts as a severe day.
pub const SEVERE_PAIN_THRESHOLD: f64 = 7.0;

/// Severity words and their anchor scores.
const PAIN_VOCABULARY: &[(&str, f64)] = &[
    ("keine", 0.0),
    ("kein", 0.0),
    ("none", 0.0),
    ("no", 0.0),
    ("leicht", 2.0),
    ("mild", 2.0),
    ("light", 2.0),
    ("mittel", 5.0),
    ("moderate", 5.0),
    ("medium", 5.0),
    ("stark", 7.0),
    ("severe", 7.0),
    ("strong", 7.0),
    ("sehr_stark", 9.0),
    ("very_severe", 9.0),
    ("very_strong", 9.0),
    ("extreme", 9.0),
    ("unerträglich", 10.0),
    ("unbearable", 10.0),
];

/// Numeric 0-10 pain score for a descriptor.
///
/// Blank descriptors have no score. Numbers are clamped to 0-10; known
/// severity words map to their anchor; anything else scores 0.
pub fn pain_score(descriptor: &str) -> Option<f64> {
    let trimmed = descriptor.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = trimmed.replace(',', ".").parse::<f64>() {
        if value.is_finite() {
            return Some(value.clamp(0.0, 10.0));
        }
    }

    let key = trimmed.to_lowercase().replace([' ', '-'], "_");
    let score = PAIN_VOCABULARY
        .iter()
        .find(|(word, _)| *word == key)
        .map(|(_, score)| *score)
        .unwrap_or(0.0);
    Some(score)
}

/// Feature record for a single diary row.
pub fn row_feature(row: &DiaryRow) -> DayFeature {
    let worst_pain = pain_score(&row.pain_level);
    let acute_medication_count = diary_medications(row)
        .iter()
        .filter(|m| !is_prophylactic_medication(m))
        .count() as u32;

    DayFeature {
        documented: true,
        had_headache: worst_pain.map_or(false, |p| p > 0.0),
        worst_pain,
        acute_medication: acute_medication_count > 0,
        acute_medication_count,
    }
}

/// Collapse all in-range diary rows into one feature per day.
///
/// Rows without a resolvable day are skipped; malformed stored dates fail.
pub fn build_day_features(rows: &[DiaryRow], range: &DayRange) -> CalendarResult<DayFeatureMap> {
    let mut features = DayFeatureMap::new();

    for row in rows {
        let Some(day) = resolve_diary_day(row)? else {
            continue;
        };
        if !range.contains(day) {
            continue;
        }

        let feature = row_feature(row);
        match features.entry(day) {
            Entry::Occupied(mut existing) => {
                let merged = existing.get().merged(&feature);
                existing.insert(merged);
            }
            Entry::Vacant(slot) => {
                slot.insert(feature);
            }
        }
    }

    Ok(features)
}
