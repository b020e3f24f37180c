//! Day-over-day deltas and cross-metric ratios.

use crate::domain::{Metric, MetricStats, MetricTable, PopulationStats, ReconciledDay, SeriesPoint};
use crate::math::{percent_change, ratio_percent};

/// Build series points (deltas and ratios populated; averages, doubling rates
/// and projections still empty) from reconciled days.
pub fn compute_deltas(days: &[ReconciledDay], population: i64) -> Vec<SeriesPoint> {
    let mut out: Vec<SeriesPoint> = Vec::with_capacity(days.len());

    for (i, day) in days.iter().enumerate() {
        let previous = i.checked_sub(1).map(|j| (&days[j], &out[j]));

        let metrics = MetricTable::from_fn(|metric| {
            let total = day.values[metric];
            let (previous_total, yesterday) = match previous {
                Some((prev_day, prev_point)) => (prev_day.values[metric], prev_point.today(metric)),
                None => (0, 0),
            };
            metric_stats(total, previous_total, yesterday)
        });

        let point = SeriesPoint {
            date: day.date,
            hit_ratio_percent: ratio_percent(
                metrics[Metric::Infected].today,
                metrics[Metric::Tested].today,
                2,
            ),
            mortality_percent: ratio_percent(metrics[Metric::Dead].total, metrics[Metric::Infected].total, 3),
            population: population_stats(&metrics, population),
            metrics,
            projections: Vec::new(),
            projection_failures: Vec::new(),
        };
        out.push(point);
    }

    out
}

/// Stats for one metric given today's and yesterday's totals and yesterday's
/// increment.
fn metric_stats(total: i64, previous_total: i64, yesterday: i64) -> MetricStats {
    let today = total.saturating_sub(previous_total);
    MetricStats {
        total,
        today,
        yesterday,
        change_percent: percent_change(total, total.saturating_sub(today)),
        daily_diff: today.saturating_sub(yesterday),
        daily_diff_percent: percent_change(today, yesterday),
        ..MetricStats::default()
    }
}

fn population_stats(metrics: &MetricTable<MetricStats>, population: i64) -> PopulationStats {
    let share = |metric: Metric| ratio_percent(metrics[metric].total, population, 3);
    PopulationStats {
        total: population,
        infected_percent: share(Metric::Infected),
        tested_percent: share(Metric::Tested),
        vaccinated_percent: share(Metric::VaccinatedDose1),
        vaccinated_full_percent: share(Metric::VaccinatedDose2),
    }
}
