//! Helper functions for metrics calculations

/// `part / whole * 100`, or 0 when `whole` is 0
pub(super) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `sum / count`, or 0 when `count` is 0
pub(super) fn average(sum: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
