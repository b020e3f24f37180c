//! End-to-end assembly.
//!
//! calendar -> reconcile -> deltas -> moving averages -> doubling rates -> projections
//!
//! The whole series is rebuilt from the raw input on every call. Nothing is
//! shared between calls, so independent snapshots can be assembled
//! concurrently, and a caller publishes the returned vector as a unit.

use std::time::Instant;

use chrono::NaiveDate;

use crate::domain::{EngineConfig, RawDailyInput, SeriesPoint};
use crate::engine::{averages, calendar, deltas, doubling, projection, reconcile};
use crate::error::EngineError;

/// Turn raw per-date partial records into the dense, enriched daily series.
///
/// `today` extends the calendar past the last report; pass the current date in
/// the reporting region's timezone.
pub fn assemble(
    raw: &RawDailyInput,
    config: &EngineConfig,
    today: NaiveDate,
) -> Result<Vec<SeriesPoint>, EngineError> {
    config.validate()?;
    let started = Instant::now();

    let days = calendar::build_calendar(raw, today)?;
    tracing::debug!(days = days.len(), "calendar built");

    let reconciled = reconcile::reconcile(&days, raw);
    let points = deltas::compute_deltas(&reconciled, config.population);
    let points = averages::compute_moving_averages(
        points,
        &config.moving_average_metrics,
        &config.moving_average_windows,
    );
    let points = doubling::compute_doubling_rates(points, &config.doubling_metrics);
    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "history enriched");

    let points = projection::compute_projections(points, &config.projection);
    tracing::debug!(
        points = points.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "series assembled"
    );

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{OutbreakConfig, generate_outbreak};
    use crate::domain::{FieldKind, Metric, ProjectedMetric, RawDay};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn synthetic() -> (RawDailyInput, NaiveDate) {
        let config = OutbreakConfig {
            days: 60,
            seed: 7,
            ..OutbreakConfig::default()
        };
        let raw = generate_outbreak(&config).unwrap();
        let today = config.start + chrono::Days::new(62);
        (raw, today)
    }

    #[test]
    fn two_day_scenario() {
        let raw: RawDailyInput = [
            (
                date(2021, 1, 1),
                RawDay {
                    infected_new: Some(10),
                    ..RawDay::default()
                },
            ),
            (
                date(2021, 1, 2),
                RawDay {
                    infected_new: Some(5),
                    ..RawDay::default()
                },
            ),
        ]
        .into();
        let points = assemble(&raw, &EngineConfig::default(), date(2021, 1, 2)).unwrap();

        assert_eq!(points.len(), 2);
        let day1 = points[0].stats(Metric::Infected);
        assert_eq!((day1.total, day1.today), (10, 10));

        let day2 = points[1].stats(Metric::Infected);
        assert_eq!(day2.total, 15);
        assert_eq!(day2.today, 5);
        assert_eq!(day2.yesterday, 10);
        assert_eq!(day2.daily_diff, -5);
        assert!(points.iter().all(|p| p.projections.is_empty()));
    }

    #[test]
    fn gap_day_snapshots_come_from_previous_record() {
        let raw: RawDailyInput = [
            (
                date(2021, 1, 1),
                RawDay {
                    hospitalized: Some(12),
                    staff_infected: Some(3),
                    ..RawDay::default()
                },
            ),
            (
                date(2021, 1, 3),
                RawDay {
                    hospitalized: Some(14),
                    ..RawDay::default()
                },
            ),
        ]
        .into();
        let points = assemble(&raw, &EngineConfig::default(), date(2021, 1, 3)).unwrap();

        assert_eq!(points[1].date, date(2021, 1, 2));
        assert_eq!(points[1].total(Metric::Hospitalized), 12);
        assert_eq!(points[1].total(Metric::StaffInfected), 3);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = assemble(&RawDailyInput::new(), &EngineConfig::default(), date(2021, 1, 1)).unwrap_err();
        assert_eq!(err, EngineError::EmptyInput);
    }

    #[test]
    fn repeated_record_is_flat() {
        let record = RawDay {
            infected: Some(50),
            tested: Some(900),
            hospitalized: Some(8),
            critical: Some(2),
            ..RawDay::default()
        };
        let raw: RawDailyInput = date(2021, 5, 1)
            .iter_days()
            .take(10)
            .map(|d| (d, record.clone()))
            .collect();
        let points = assemble(&raw, &EngineConfig::default(), date(2021, 5, 10)).unwrap();

        for p in &points[1..] {
            assert_eq!(p.today(Metric::Infected), 0);
            assert_eq!(p.today(Metric::Tested), 0);
            assert_eq!(p.total(Metric::Infected), 50);
        }
        assert!(points.iter().all(|p| p.total(Metric::Hospitalized) == 8));
        assert!(points.iter().all(|p| p.total(Metric::Critical) == 2));
    }

    #[test]
    fn calendar_is_contiguous_through_today() {
        let (raw, today) = synthetic();
        let points = assemble(&raw, &EngineConfig::default(), today).unwrap();

        assert_eq!(points.first().map(|p| p.date), raw.keys().next().copied());
        assert_eq!(points.last().map(|p| p.date), Some(today));
        for pair in points.windows(2) {
            assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn counters_are_monotonic_and_deltas_consistent() {
        let (raw, today) = synthetic();
        let points = assemble(&raw, &EngineConfig::default(), today).unwrap();

        for metric in Metric::ALL.into_iter().filter(|m| m.kind() != FieldKind::Snapshot) {
            assert_eq!(points[0].today(metric), points[0].total(metric));
            for pair in points.windows(2) {
                let (prev, cur) = (&pair[0], &pair[1]);
                assert!(cur.total(metric) >= prev.total(metric), "{metric} decreased on {}", cur.date);
                assert_eq!(cur.today(metric), cur.total(metric) - prev.total(metric));
                assert_eq!(cur.stats(metric).yesterday, prev.today(metric));
            }
        }
    }

    #[test]
    fn projections_start_after_history_and_stay_ordered() {
        let (raw, today) = synthetic();
        let config = EngineConfig::default();
        let points = assemble(&raw, &config, today).unwrap();
        let history = config.projection.history_length;

        for (i, point) in points.iter().enumerate() {
            if i < history {
                assert!(point.projections.is_empty(), "{} projected too early", point.date);
                continue;
            }
            assert_eq!(point.projections.len(), config.projection.projection_length);
            assert!(point.projection_failures.is_empty(), "{:?}", point.projection_failures);

            let mut previous = point.total(Metric::Infected) as f64;
            for projected in &point.projections {
                assert!(projected.date > point.date);
                for e in projected.estimates.values() {
                    assert!(e.lower <= e.value && e.value <= e.upper, "{e:?}");
                    assert!(e.lower >= 0.0);
                }
                let infected = projected.estimates[&ProjectedMetric::Infected];
                assert!(infected.value >= previous);
                previous = infected.value;
            }
        }
    }

    #[test]
    fn projection_failure_is_isolated_per_metric() {
        let (raw, today) = synthetic();
        let mut config = EngineConfig::default();
        config.projection.targets[1].degree = 40;
        // Validation would reject this configuration up front; run the stage
        // directly to exercise isolation.
        let full = assemble(&raw, &EngineConfig::default(), today).unwrap();
        let points = projection::compute_projections(full.clone(), &config.projection);

        let anchor = &points[config.projection.history_length];
        assert_eq!(anchor.projection_failures.len(), 1);
        assert_eq!(anchor.projection_failures[0].metric, ProjectedMetric::Dead);
        assert!(anchor.projections[0].estimates.contains_key(&ProjectedMetric::Infected));
        assert!(!anchor.projections[0].estimates.contains_key(&ProjectedMetric::Dead));
        assert_eq!(
            anchor.stats(Metric::Infected),
            full[config.projection.history_length].stats(Metric::Infected)
        );
    }

    #[test]
    fn oversized_dose_totals_assemble() {
        let half = i64::MAX / 2 + 10;
        let raw: RawDailyInput = [(
            date(2021, 1, 1),
            RawDay {
                vaccinated_dose_1: Some(half),
                vaccinated_dose_2: Some(half),
                ..RawDay::default()
            },
        )]
        .into();
        let points = assemble(&raw, &EngineConfig::default(), date(2021, 1, 3)).unwrap();

        for p in &points {
            assert_eq!(p.total(Metric::VaccinatedDoses), i64::MAX);
        }
        let json = serde_json::to_value(&points[0]).unwrap();
        assert_eq!(json["vaccinated"]["doses"]["total"], i64::MAX);
    }

    #[test]
    fn invalid_projection_config_is_rejected() {
        let (raw, today) = synthetic();
        let mut config = EngineConfig::default();
        config.projection.history_length = 1;
        let err = assemble(&raw, &config, today).unwrap_err();
        assert!(matches!(err, EngineError::ProjectionInput { .. }), "{err:?}");
    }
}
