//! Doubling-time estimates.
//!
//! Assumes locally exponential growth between two readings. This is a
//! one-step linearization of the recent growth rate, not a forecast.

use crate::domain::{Metric, SeriesPoint};
use crate::math::{round_to, trailing_mean};

/// Window of the smoothed variant's moving average.
const SMOOTHING_WINDOW: usize = 3;

/// Days for `old` to grow into `new` twice over, rounded to 2 places.
///
/// Returns 0 when growth is undefined: either value is zero or they are equal.
pub fn doubling_rate(new: f64, old: f64) -> f64 {
    if new == 0.0 || old == 0.0 || new == old {
        return 0.0;
    }
    let growth = 1.0 + (new - old) / old.max(1.0);
    if growth <= 0.0 || growth == 1.0 {
        return 0.0;
    }
    let rate = 2f64.ln() / growth.ln();
    if rate.is_finite() { round_to(rate, 2) } else { 0.0 }
}

/// Attach doubling rates to `metrics`.
///
/// The standard rate compares today's total with yesterday's. The smoothed
/// rate compares today's total with today's total minus the 3-day moving
/// average of the daily delta.
pub fn compute_doubling_rates(points: Vec<SeriesPoint>, metrics: &[Metric]) -> Vec<SeriesPoint> {
    let series: Vec<(Metric, Vec<i64>, Vec<i64>)> = metrics
        .iter()
        .map(|&m| {
            let totals = points.iter().map(|p| p.total(m)).collect();
            let deltas = points.iter().map(|p| p.today(m)).collect();
            (m, totals, deltas)
        })
        .collect();

    points
        .into_iter()
        .enumerate()
        .map(|(i, mut point)| {
            for (metric, totals, deltas) in &series {
                let new = totals[i] as f64;
                let old = if i == 0 { 0.0 } else { totals[i - 1] as f64 };
                let smoothed_old = new - trailing_mean(deltas, i, SMOOTHING_WINDOW);

                let stats = &mut point.metrics[*metric];
                stats.doubling_rate = Some(doubling_rate(new, old));
                stats.doubling_rate_from_mov_avg_3 = Some(doubling_rate(new, smoothed_old));
            }
            point
        })
        .collect()
}
