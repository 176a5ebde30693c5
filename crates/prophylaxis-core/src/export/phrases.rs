//! Report wording.
//!
//! All sentences the report can contain live here so the truthfulness rules in
//! [`super::text`] only decide *which* sentence is emitted.

/// Warning for events whose date is inferred from a schedule.
pub const ESTIMATED_DOSES_WARNING: &str = "Some dose dates are schedule-estimated and unconfirmed. \
The actual administration may have happened on a different day.";

/// Warning for sparse diary coverage around the doses.
pub const LIMITED_EVIDENCE_WARNING: &str = "The headache diary around the doses is incomplete. \
The observations below have limited evidential strength.";

/// Closing paragraph of every non-empty report.
pub const CORRELATION_DISCLAIMER: &str = "These observations describe a documented association \
in time only. They do not show that the medication caused any change, and they are not a \
recommendation to change treatment. Please discuss them with the treating physician.";

pub fn report_title(display_name: &str, start: &str, end: &str) -> String {
    format!("Prophylaxis report: {} ({} to {})", display_name, start, end)
}

pub fn no_documented_doses(display_name: &str, start: &str, end: &str) -> String {
    format!(
        "No documented doses of {} were found between {} and {}. \
No statement about the course of headaches around doses can be made for this period.",
        display_name, start, end
    )
}

/// Opening paragraph: how the doses were established and how certain they are.
pub fn evidence_overview(
    display_name: &str,
    event_count: u32,
    distribution: &str,
    confidence_range: &str,
) -> String {
    format!(
        "{} {} of {} identified ({}). Confidence in the dose dates: {}.",
        event_count,
        if event_count == 1 { "dose" } else { "doses" },
        display_name,
        distribution,
        confidence_range
    )
}

pub fn source_share(count: u32, label: &str) -> String {
    format!("{} from {}", count, label)
}

pub fn confidence_range(worst_percent: u32, best_percent: u32) -> String {
    if worst_percent == best_percent {
        format!("{}%", best_percent)
    } else {
        format!("{}% to {}%", worst_percent, best_percent)
    }
}

pub fn clear_change(metric: &str, improved: bool, amount: &str, comparison_count: u32) -> String {
    format!(
        "{} {} by {} on average in the days after a dose compared to the days before ({} {}).",
        capitalize(metric),
        if improved { "decreased" } else { "increased" },
        amount,
        comparison_count,
        if comparison_count == 1 { "dose" } else { "doses" }
    )
}

pub fn no_clear_change(metric: &str) -> String {
    format!(
        "{} showed no clear change between the days before and after the doses.",
        capitalize(metric)
    )
}

/// Hedged improvement when the evidence is too weak for a firm statement.
pub fn possible_improvement(metric: &str, amount: &str) -> String {
    format!(
        "The records may indicate a lower {} after the doses (about {}), \
but the data is not sufficient for a firm statement.",
        metric, amount
    )
}

pub fn percentage_points(delta: f64) -> String {
    format!("{:.0} percentage points", delta.abs() * 100.0)
}

pub fn intensity_points(delta: f64) -> String {
    format!("{:.1} points on the 0-10 scale", delta.abs())
}

pub fn percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

pub fn event_line(
    day: &str,
    time: Option<&str>,
    source_label: &str,
    confidence_percent: u32,
    evidence_count: usize,
    pre_rate: &str,
    post_rate: &str,
) -> String {
    format!(
        "{} {}: {}, confidence {}%, {} evidence {}, headache days {} before / {} after",
        day,
        time.map_or_else(|| "(time not recorded)".to_string(), |t| format!("at {}", t)),
        source_label,
        confidence_percent,
        evidence_count,
        if evidence_count == 1 { "item" } else { "items" },
        pre_rate,
        post_rate
    )
}

pub fn dose_spacing(days_since_previous: i64, typical_interval_days: Option<u32>) -> String {
    match typical_interval_days {
        Some(typical) => format!(
            "{} days after the previous dose (typical interval {} days)",
            days_since_previous, typical
        ),
        None => format!("{} days after the previous dose", days_since_previous),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
