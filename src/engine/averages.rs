//! Trailing moving averages over daily deltas.
//!
//! For the first `window - 1` days of the series the window shrinks to the
//! days available, so every point carries every configured average.

use std::num::NonZeroUsize;

use crate::domain::{Metric, MovingAverage, SeriesPoint};
use crate::math::trailing_mean;

/// Attach `today_mov_avg_<window>` values for each metric and window.
pub fn compute_moving_averages(
    points: Vec<SeriesPoint>,
    metrics: &[Metric],
    windows: &[NonZeroUsize],
) -> Vec<SeriesPoint> {
    let deltas: Vec<(Metric, Vec<i64>)> = metrics
        .iter()
        .map(|&m| (m, points.iter().map(|p| p.today(m)).collect()))
        .collect();

    points
        .into_iter()
        .enumerate()
        .map(|(i, mut point)| {
            for (metric, values) in &deltas {
                point.metrics[*metric].moving_averages = windows
                    .iter()
                    .map(|w| MovingAverage {
                        window: w.get(),
                        value: trailing_mean(values, i, w.get()),
                    })
                    .collect();
            }
            point
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{MetricTable, ReconciledDay};
    use crate::engine::deltas::compute_deltas;

    fn windows(ws: &[usize]) -> Vec<NonZeroUsize> {
        ws.iter().filter_map(|&w| NonZeroUsize::new(w)).collect()
    }

    fn points_with_daily(daily: &[i64]) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let mut total = 0;
        let days: Vec<ReconciledDay> = daily
            .iter()
            .zip(start.iter_days())
            .map(|(&d, date)| {
                total += d;
                let mut values = MetricTable::default();
                values[Metric::Infected] = total;
                ReconciledDay { date, values }
            })
            .collect();
        compute_deltas(&days, 1000)
    }

    #[test]
    fn partial_windows_average_available_days() {
        let points = compute_moving_averages(
            points_with_daily(&[3, 6, 9, 12, 15]),
            &[Metric::Infected],
            &windows(&[3, 7]),
        );

        let ma3: Vec<f64> = points
            .iter()
            .map(|p| p.stats(Metric::Infected).moving_average(3).unwrap())
            .collect();
        assert_eq!(ma3, vec![3.0, 4.5, 6.0, 9.0, 12.0]);

        let ma7 = points[4].stats(Metric::Infected).moving_average(7);
        assert_eq!(ma7, Some(9.0));
    }

    #[test]
    fn only_configured_metrics_are_averaged() {
        let points = compute_moving_averages(points_with_daily(&[1, 2]), &[Metric::Dead], &windows(&[3]));
        assert!(points[1].stats(Metric::Infected).moving_averages.is_empty());
        assert_eq!(points[1].stats(Metric::Dead).moving_average(3), Some(0.0));
    }

    #[test]
    fn averages_round_to_two_places() {
        let points = compute_moving_averages(points_with_daily(&[1, 1, 2]), &[Metric::Infected], &windows(&[3]));
        assert_eq!(points[2].stats(Metric::Infected).moving_average(3), Some(1.33));
    }
}
