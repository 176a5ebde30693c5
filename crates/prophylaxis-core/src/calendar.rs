//! Berlin-anchored calendar-day arithmetic.
//!
//! Every day-level comparison in the engine goes through [`DayKey`]. The Berlin
//! UTC offset is derived from the EU summer-time rule using proleptic calendar
//! math only, so nothing here reads the host timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Calendar validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Malformed day key {0:?}: expected YYYY-MM-DD")]
    Malformed(String),

    #[error("Impossible calendar date: {0}")]
    Impossible(String),

    #[error("Day arithmetic out of range: {day} {offset:+} days")]
    OutOfRange { day: String, offset: i64 },

    #[error("Inverted day range: {start} is after {end}")]
    InvertedRange { start: String, end: String },
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Central European Time, UTC+1.
const CET_OFFSET_HOURS: i64 = 1;

/// Central European Summer Time, UTC+2.
const CEST_OFFSET_HOURS: i64 = 2;

/// Summer time starts and ends at 01:00 UTC on the last Sunday of the month.
const TRANSITION_HOUR_UTC: u32 = 1;

/// A Berlin calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Parse a strict `YYYY-MM-DD` key. Impossible dates are rejected, never rolled over.
    pub fn parse(key: &str) -> CalendarResult<Self> {
        let bytes = key.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() });
        if !well_formed {
            return Err(CalendarError::Malformed(key.to_string()));
        }

        let malformed = || CalendarError::Malformed(key.to_string());
        let year: i32 = key[0..4].parse().map_err(|_| malformed())?;
        let month: u32 = key[5..7].parse().map_err(|_| malformed())?;
        let day: u32 = key[8..10].parse().map_err(|_| malformed())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(DayKey)
            .ok_or_else(|| CalendarError::Impossible(key.to_string()))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        DayKey(date)
    }

    /// The Berlin calendar day on which a UTC instant falls.
    pub fn from_utc(instant: &DateTime<Utc>) -> Self {
        DayKey(berlin_local(instant).date())
    }

    /// Shift by a signed number of calendar days.
    pub fn add_days(self, offset: i64) -> CalendarResult<Self> {
        let days = Days::new(offset.unsigned_abs());
        let shifted = if offset >= 0 {
            self.0.checked_add_days(days)
        } else {
            self.0.checked_sub_days(days)
        };
        shifted.map(DayKey).ok_or_else(|| CalendarError::OutOfRange {
            day: self.to_string(),
            offset,
        })
    }

    /// Signed number of calendar days from `self` to `other`.
    pub fn days_until(self, other: DayKey) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayKey::parse(s)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DayKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Inclusive range of Berlin calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: DayKey,
    pub end: DayKey,
}

impl DayRange {
    pub fn new(start: DayKey, end: DayKey) -> CalendarResult<Self> {
        if start > end {
            return Err(CalendarError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse both ends from `YYYY-MM-DD` keys.
    pub fn parse(start: &str, end: &str) -> CalendarResult<Self> {
        Self::new(DayKey::parse(start)?, DayKey::parse(end)?)
    }

    pub fn contains(&self, day: DayKey) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days in the range, both ends included.
    pub fn len_days(&self) -> u32 {
        u32::try_from(self.start.days_until(self.end) + 1).unwrap_or(0)
    }

    /// Widen the range by `before` days at the start and `after` days at the end.
    pub fn widened(&self, before: u32, after: u32) -> CalendarResult<Self> {
        Self::new(
            self.start.add_days(-i64::from(before))?,
            self.end.add_days(i64::from(after))?,
        )
    }
}

/// Berlin wall-clock time for a UTC instant.
fn berlin_local(instant: &DateTime<Utc>) -> NaiveDateTime {
    let utc = instant.naive_utc();
    let offset = if is_berlin_summer_time(&utc) {
        CEST_OFFSET_HOURS
    } else {
        CET_OFFSET_HOURS
    };
    utc.checked_add_signed(Duration::hours(offset)).unwrap_or(utc)
}

fn is_berlin_summer_time(utc: &NaiveDateTime) -> bool {
    let year = utc.year();
    match (last_sunday_transition(year, 3), last_sunday_transition(year, 10)) {
        (Some(start), Some(end)) => *utc >= start && *utc < end,
        _ => false,
    }
}

/// 01:00 UTC on the last Sunday of a 31-day month.
fn last_sunday_transition(year: i32, month: u32) -> Option<NaiveDateTime> {
    let last_day = NaiveDate::from_ymd_opt(year, month, 31)?;
    let back = last_day.weekday().num_days_from_sunday();
    last_day
        .checked_sub_days(Days::new(u64::from(back)))?
        .and_hms_opt(TRANSITION_HOUR_UTC, 0, 0)
}

/// Berlin calendar-day key (`YYYY-MM-DD`) for a UTC instant.
pub fn berlin_day_key(instant: &DateTime<Utc>) -> String {
    DayKey::from_utc(instant).to_string()
}

/// Berlin clock time (`HH:mm`) for a UTC instant.
pub fn berlin_time_label(instant: &DateTime<Utc>) -> String {
    berlin_local(instant).format("%H:%M").to_string()
}

/// Add a signed number of days to a `YYYY-MM-DD` key.
pub fn add_berlin_days(key: &str, offset: i64) -> CalendarResult<String> {
    Ok(DayKey::parse(key)?.add_days(offset)?.to_string())
}

/// Signed day difference `to - from` between two keys.
pub fn diff_berlin_days(from: &str, to: &str) -> CalendarResult<i64> {
    Ok(DayKey::parse(from)?.days_until(DayKey::parse(to)?))
}

/// Inclusive range test on `YYYY-MM-DD` keys. An inverted range contains nothing.
pub fn is_in_berlin_range(day: &str, start: &str, end: &str) -> CalendarResult<bool> {
    let day = DayKey::parse(day)?;
    Ok(DayKey::parse(start)? <= day && day <= DayKey::parse(end)?)
}

/// Validate a clock label of the form `H:mm` or `HH:mm`, optionally with `:ss`.
pub fn normalize_time_label(label: &str) -> Option<String> {
    let mut parts = label.trim().split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    let seconds = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if hours.len() > 2 || !all_digits(hours) || minutes.len() != 2 || !all_digits(minutes) {
        return None;
    }
    if let Some(seconds) = seconds {
        if seconds.len() != 2 || !all_digits(seconds) || seconds > "59" {
            return None;
        }
    }

    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then(|| format!("{:02}:{:02}", hours, minutes))
}
