//! Formatted terminal output for an assembled series.

use crate::domain::{Metric, ProjectedMetric, SeriesPoint};

/// Headline counters for the latest day.
pub fn format_summary(points: &[SeriesPoint]) -> String {
    let Some(current) = points.last() else {
        return "No data.\n".to_string();
    };
    let first = points.first().map(|p| p.date).unwrap_or(current.date);

    let mut out = String::new();
    out.push_str("=== coroner - daily series ===\n");
    out.push_str(&format!("Range: {first} .. {} ({} days)\n", current.date, points.len()));

    out.push_str("\nCounters:\n");
    for metric in [
        Metric::Infected,
        Metric::Dead,
        Metric::Tested,
        Metric::VaccinatedDoses,
        Metric::Hospitalized,
        Metric::Critical,
        Metric::StaffInfected,
    ] {
        let s = current.stats(metric);
        out.push_str(&format!(
            "  {:<28} total={:>9} today={:>7} diff={:>+7}",
            metric.name(),
            s.total,
            s.today,
            s.daily_diff
        ));
        if let Some(ma) = s.moving_average(7) {
            out.push_str(&format!(" ma7={ma:>9.2}"));
        }
        if let Some(rate) = s.doubling_rate.filter(|r| *r != 0.0) {
            out.push_str(&format!(" doubling={rate:.2}d"));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "\nChange: {:.2}% | Hit ratio: {:.2}% | Mortality: {:.3}% | Infected pop.: {:.3}%\n",
        current.stats(Metric::Infected).change_percent,
        current.hit_ratio_percent,
        current.mortality_percent,
        current.population.infected_percent,
    ));

    out
}

/// Projection table for the latest day (value and band per metric).
pub fn format_projections(point: &SeriesPoint) -> String {
    if point.projections.is_empty() && point.projection_failures.is_empty() {
        return format!("No projections for {} (not enough history).\n", point.date);
    }

    let mut out = String::new();
    out.push_str(&format!("\nProjections from {}:\n", point.date));
    out.push_str(&format!("  {:<10}", "date"));
    for metric in ProjectedMetric::ALL {
        out.push_str(&format!(" {:>26}", metric.name()));
    }
    out.push('\n');

    for projected in &point.projections {
        out.push_str(&format!("  {:<10}", projected.date.to_string()));
        for metric in ProjectedMetric::ALL {
            let cell = projected
                .estimates
                .get(&metric)
                .map(|e| format!("{:.0} [{:.0}, {:.0}]", e.value, e.lower, e.upper))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(" {cell:>26}"));
        }
        out.push('\n');
    }

    for failure in &point.projection_failures {
        out.push_str(&format!("  ! {}\n", failure.error));
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::{OutbreakConfig, generate_outbreak};
    use crate::domain::EngineConfig;
    use crate::engine::assemble;

    fn series() -> Vec<SeriesPoint> {
        let config = OutbreakConfig {
            days: 30,
            ..OutbreakConfig::default()
        };
        let raw = generate_outbreak(&config).unwrap();
        let today = NaiveDate::from_ymd_opt(2020, 3, 24).unwrap();
        assemble(&raw, &EngineConfig::default(), today).unwrap()
    }

    #[test]
    fn summary_lists_range_and_counters() {
        let points = series();
        let text = format_summary(&points);
        assert!(text.contains("Range: 2020-02-24 .. 2020-03-24 (30 days)"), "{text}");
        assert!(text.contains("hospitalized.general"));
        assert!(text.contains("Hit ratio"));
        assert_eq!(format_summary(&[]), "No data.\n");
    }

    #[test]
    fn projection_table_has_one_row_per_day() {
        let points = series();
        let latest = points.last().unwrap();
        let text = format_projections(latest);
        let rows = text.lines().filter(|l| l.trim_start().starts_with("2020-")).count();
        assert_eq!(rows, latest.projections.len());

        let early = format_projections(&points[0]);
        assert!(early.contains("not enough history"));
    }
}
