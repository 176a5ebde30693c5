//! Property tests for Berlin calendar-day arithmetic.

use chrono::{Datelike, NaiveDate, TimeZone, Utc, Weekday};
use proptest::prelude::*;

use prophylaxis_core::calendar::{add_berlin_days, berlin_day_key, diff_berlin_days, DayKey};

fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn last_sunday(year: i32, month: u32) -> NaiveDate {
    let mut day = NaiveDate::from_ymd_opt(year, month, 31).unwrap();
    while day.weekday() != Weekday::Sun {
        day = day.pred_opt().unwrap();
    }
    day
}

fn day_key() -> impl Strategy<Value = String> {
    (1970i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d))
}

proptest! {
    #[test]
    fn add_then_diff_is_offset(key in day_key(), offset in -4000i64..4000) {
        let shifted = add_berlin_days(&key, offset).unwrap();
        prop_assert_eq!(diff_berlin_days(&key, &shifted).unwrap(), offset);
    }

    #[test]
    fn add_is_reversible(key in day_key(), offset in -4000i64..4000) {
        let shifted = add_berlin_days(&key, offset).unwrap();
        prop_assert_eq!(add_berlin_days(&shifted, -offset).unwrap(), key);
    }

    #[test]
    fn diff_is_antisymmetric(a in day_key(), b in day_key()) {
        prop_assert_eq!(
            diff_berlin_days(&a, &b).unwrap(),
            -diff_berlin_days(&b, &a).unwrap()
        );
    }

    #[test]
    fn year_span_depends_on_leap_year(year in 1970i32..2100) {
        let start = format!("{:04}-01-01", year);
        let end = format!("{:04}-12-31", year);
        let expected = if is_leap(year) { 365 } else { 364 };
        prop_assert_eq!(diff_berlin_days(&start, &end).unwrap(), expected);
    }

    #[test]
    fn dst_days_shift_by_exactly_one(year in 1996i32..2100) {
        for month in [3, 10] {
            let transition = last_sunday(year, month);
            let before = DayKey::from_date(transition.pred_opt().unwrap()).to_string();
            let after = DayKey::from_date(transition.succ_opt().unwrap()).to_string();

            prop_assert_eq!(add_berlin_days(&before, 1).unwrap(), transition.to_string());
            prop_assert_eq!(add_berlin_days(&before, 2).unwrap(), after.clone());
            prop_assert_eq!(diff_berlin_days(&before, &after).unwrap(), 2);
        }
    }

    #[test]
    fn local_midnight_belongs_to_new_day(year in 1996i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let offset = if date > last_sunday(year, 3) && date < last_sunday(year, 10) { 2 } else { 1 };

        // 00:30 Berlin local time, expressed in UTC
        let local_half_past = date.and_hms_opt(0, 30, 0).unwrap() - chrono::Duration::hours(offset);
        let instant = Utc.from_utc_datetime(&local_half_past);
        prop_assert_eq!(berlin_day_key(&instant), date.to_string());
    }
}

#[test]
fn test_known_transitions_2024() {
    // Summer time starts 2024-03-31 and ends 2024-10-27
    assert_eq!(add_berlin_days("2024-03-30", 1).unwrap(), "2024-03-31");
    assert_eq!(add_berlin_days("2024-03-31", 1).unwrap(), "2024-04-01");
    assert_eq!(add_berlin_days("2024-10-27", -1).unwrap(), "2024-10-26");

    let before_switch = Utc.with_ymd_and_hms(2024, 3, 31, 0, 59, 0).unwrap();
    let after_switch = Utc.with_ymd_and_hms(2024, 3, 31, 22, 30, 0).unwrap();
    assert_eq!(berlin_day_key(&before_switch), "2024-03-31");
    assert_eq!(berlin_day_key(&after_switch), "2024-04-01");
}

#[test]
fn test_rejects_malformed_keys() {
    for key in ["2024-2-01", "2024-02-30", "20240201", "", "2024-13-01", "abcd-ef-gh"] {
        assert!(add_berlin_days(key, 1).is_err(), "Key {:?} should be rejected", key);
    }
}
