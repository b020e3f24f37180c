//! Rounding, percentages, and small order statistics.

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Percentage change from `old` to `new`, rounded to 2 places.
///
/// The divisor is floored at 1, so growth from zero reports a large finite
/// percentage rather than an error.
pub fn percent_change(new: i64, old: i64) -> f64 {
    round_to((new as f64 - old as f64) / old.max(1) as f64 * 100.0, 2)
}

/// `numerator / max(denominator, 1) * 100`, rounded to `places`.
pub fn ratio_percent(numerator: i64, denominator: i64, places: i32) -> f64 {
    round_to(numerator as f64 / denominator.max(1) as f64 * 100.0, places)
}

/// Median of `values`; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Mean of the trailing `window` values ending at `end` (inclusive), rounded
/// to 2 places.
///
/// Near the start of the series the window shrinks to the values available.
pub fn trailing_mean(values: &[i64], end: usize, window: usize) -> f64 {
    let start = (end + 1).saturating_sub(window.max(1));
    let slice = &values[start..=end];
    let sum: i128 = slice.iter().map(|&v| i128::from(v)).sum();
    round_to(sum as f64 / slice.len() as f64, 2)
}
