//! Pre/post window statistics around dose events.

use crate::calendar::{CalendarResult, DayRange};
use crate::config::AnalysisConfig;
use crate::models::{AggregateDeltas, DoseComparison, DoseEvent, WindowStats};

use super::day_features::{DayFeatureMap, SEVERE_PAIN_THRESHOLD};

/// Round a ratio to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round an intensity to one decimal.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Zero denominators give 0, never NaN.
fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn mean_of(comparisons: &[DoseComparison], field: impl Fn(&DoseComparison) -> f64) -> f64 {
    let values: Vec<f64> = comparisons.iter().map(field).collect();
    mean(&values).unwrap_or(0.0)
}

/// Statistics over one window of days.
///
/// Rates divide by documented days; coverage divides by the nominal length.
/// Intensity figures use only days with pain above zero.
pub fn window_stats(features: &DayFeatureMap, window: &DayRange) -> WindowStats {
    let window_days = window.len_days();
    let mut documented_days = 0;
    let mut headache_days = 0;
    let mut acute_med_days = 0;
    let mut acute_med_total = 0;
    let mut severe_days = 0;
    let mut intensities = Vec::new();

    for feature in features.range(window.start..=window.end).map(|(_, f)| f) {
        if !feature.documented {
            continue;
        }
        documented_days += 1;
        if feature.had_headache {
            headache_days += 1;
        }
        if feature.acute_medication {
            acute_med_days += 1;
        }
        acute_med_total += feature.acute_medication_count;
        if let Some(pain) = feature.worst_pain.filter(|p| *p > 0.0) {
            intensities.push(pain);
            if pain >= SEVERE_PAIN_THRESHOLD {
                severe_days += 1;
            }
        }
    }

    WindowStats {
        window_days,
        documented_days,
        coverage: round2(ratio(documented_days, window_days)),
        headache_days,
        headache_rate: round2(ratio(headache_days, documented_days)),
        intensity_mean: mean(&intensities).map(round1),
        intensity_median: median(&intensities).map(round1),
        intensity_max: intensities.iter().copied().reduce(f64::max).map(round1),
        acute_med_days,
        acute_med_rate: round2(ratio(acute_med_days, documented_days)),
        acute_med_total,
        severe_days,
    }
}

/// The `days` days immediately before a dose day.
pub fn pre_window(event: &DoseEvent, days: u32) -> CalendarResult<DayRange> {
    DayRange::new(event.day.add_days(-i64::from(days))?, event.day.add_days(-1)?)
}

/// The `days` days immediately after a dose day.
pub fn post_window(event: &DoseEvent, days: u32) -> CalendarResult<DayRange> {
    DayRange::new(event.day.add_days(1)?, event.day.add_days(i64::from(days))?)
}

/// Compare the windows before and after one dose.
pub fn compare_dose(
    event: &DoseEvent,
    features: &DayFeatureMap,
    config: &AnalysisConfig,
) -> CalendarResult<DoseComparison> {
    let pre = window_stats(features, &pre_window(event, config.pre_window_days)?);
    let post = window_stats(features, &post_window(event, config.post_window_days)?);

    let intensity_delta = match (pre.intensity_mean, post.intensity_mean) {
        (Some(before), Some(after)) => Some(round1(after - before)),
        _ => None,
    };

    Ok(DoseComparison {
        event: event.clone(),
        headache_rate_delta: round2(post.headache_rate - pre.headache_rate),
        intensity_delta,
        acute_med_rate_delta: round2(post.acute_med_rate - pre.acute_med_rate),
        pre,
        post,
    })
}

/// Mean deltas across comparisons; `None` when there are none.
pub fn aggregate_comparisons(comparisons: &[DoseComparison]) -> Option<AggregateDeltas> {
    if comparisons.is_empty() {
        return None;
    }

    let intensity: Vec<f64> = comparisons.iter().filter_map(|c| c.intensity_delta).collect();

    Some(AggregateDeltas {
        comparison_count: comparisons.len() as u32,
        mean_headache_rate_delta: round2(mean_of(comparisons, |c| c.headache_rate_delta)),
        mean_intensity_delta: mean(&intensity).map(round1),
        mean_acute_med_rate_delta: round2(mean_of(comparisons, |c| c.acute_med_rate_delta)),
        mean_pre_coverage: round2(mean_of(comparisons, |c| c.pre.coverage)),
        mean_post_coverage: round2(mean_of(comparisons, |c| c.post.coverage)),
    })
}
