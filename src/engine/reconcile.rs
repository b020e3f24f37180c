//! Record reconciliation.
//!
//! Turns sparse raw records into one fully populated [`ReconciledDay`] per
//! calendar date. Each day is reconciled against the previous reconciled day:
//!
//! - Cumulative counters: accept the raw value only if it is greater than the
//!   previous total. Downward corrections and nulls keep the previous total.
//! - Snapshot gauges: accept the raw value only if it is strictly positive.
//!   The upstream feed reports zero or null when a figure was not published,
//!   so zero is read as "no reading", never as "the count is zero".
//! - Derived fields are recomputed from the reconciled counters.
//!
//! A date with no raw record reuses the most recent raw record (without its
//! daily increments) instead of being treated as all-missing.

use chrono::NaiveDate;

use crate::domain::{FieldKind, Metric, MetricTable, RawDailyInput, RawDay, RawReading, ReconciledDay};

/// Reconcile every date of `calendar` in order.
pub fn reconcile(calendar: &[NaiveDate], raw: &RawDailyInput) -> Vec<ReconciledDay> {
    let Some(&first) = calendar.first() else {
        return Vec::new();
    };

    let mut out: Vec<ReconciledDay> = Vec::with_capacity(calendar.len());
    let mut previous = ReconciledDay::day_zero(first);
    let mut last_raw: Option<&RawDay> = None;

    for &date in calendar {
        let carried;
        let record = match raw.get(&date) {
            Some(record) => {
                last_raw = Some(record);
                record
            }
            None => {
                carried = last_raw.map(RawDay::carried_forward).unwrap_or_default();
                &carried
            }
        };

        let day = reconcile_day(date, record, &previous);
        out.push(day.clone());
        previous = day;
    }

    out
}

/// Reconcile one date's raw record against the previous reconciled day.
pub fn reconcile_day(date: NaiveDate, raw: &RawDay, previous: &ReconciledDay) -> ReconciledDay {
    let mut values = MetricTable::from_fn(|metric| {
        let prev = previous.values[metric];
        match raw.reading(metric) {
            RawReading::Counter { total, new } => monotonic_counter(prev, total, new),
            RawReading::Gauge(reading) => last_valid(prev, reading),
            RawReading::Derived => prev,
        }
    });

    for metric in Metric::ALL {
        if metric.kind() == FieldKind::Derived {
            values[metric] = derive(metric, &values);
        }
    }

    ReconciledDay { date, values }
}

/// Monotonic-counter rule. A reported total takes precedence over a reported
/// increment; either is only accepted if it moves the total upwards.
fn monotonic_counter(previous: i64, total: Option<i64>, new: Option<i64>) -> i64 {
    let from_total = total.filter(|&v| v > previous);
    let from_increment = new.map(|n| previous.saturating_add(n)).filter(|&v| v > previous);
    from_total.or(from_increment).unwrap_or(previous)
}

/// Last-valid rule for gauges.
fn last_valid(previous: i64, reading: Option<i64>) -> i64 {
    reading.filter(|&v| v > 0).unwrap_or(previous)
}

fn derive(metric: Metric, values: &MetricTable<i64>) -> i64 {
    match metric {
        Metric::VaccinatedDoses => {
            values[Metric::VaccinatedDose1].saturating_add(values[Metric::VaccinatedDose2])
        }
        other => values[other],
    }
}
