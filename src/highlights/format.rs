//! Display helpers for highlight cards.

/// Compact number with a `K`/`M` suffix and one decimal, e.g. `12.3K`.
///
/// Values under 1000 are rounded to an integer; negatives and non-finite
/// values render as `0`.
pub fn format_compact(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "0".to_string();
    }

    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1000.0 {
        format!("{:.1}K", value / 1000.0)
    } else {
        format!("{}", value.round() as u64)
    }
}

/// Seconds as `m:ss`; minutes are not wrapped into hours.
pub fn format_mm_ss(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.trunc() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// A 0.0..=1.0 fraction as a percentage with one decimal, e.g. `66.7%`.
pub fn format_percent(fraction: f64) -> String {
    if !fraction.is_finite() {
        return "0%".to_string();
    }
    format!("{:.1}%", fraction * 100.0)
}
