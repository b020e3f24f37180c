//! Nested key-value view of a [`SeriesPoint`].
//!
//! The serving side publishes each point as nested groups per metric
//! (`infected.total`, `hospitalized.general.today_mov_avg_3`, ...). The engine's
//! own types stay flat and typed; this module owns the mapping.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::domain::{
    Metric, MetricStats, PopulationStats, ProjectedMetric, ProjectionFailure, ProjectionPoint, SeriesPoint,
};

#[derive(Debug, Serialize)]
struct StatsView {
    total: i64,
    today: i64,
    yesterday: i64,
    change_percent: f64,
    daily_diff: i64,
    daily_diff_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    doubling_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doubling_rate_from_mov_avg_3: Option<f64>,
    /// Moving averages (`today_mov_avg_<window>`) and group-specific ratios.
    #[serde(flatten)]
    extra: BTreeMap<String, f64>,
}

impl StatsView {
    fn new(stats: &MetricStats) -> Self {
        let extra = stats
            .moving_averages
            .iter()
            .map(|ma| (format!("today_mov_avg_{}", ma.window), ma.value))
            .collect();
        Self {
            total: stats.total,
            today: stats.today,
            yesterday: stats.yesterday,
            change_percent: stats.change_percent,
            daily_diff: stats.daily_diff,
            daily_diff_percent: stats.daily_diff_percent,
            doubling_rate: stats.doubling_rate,
            doubling_rate_from_mov_avg_3: stats.doubling_rate_from_mov_avg_3,
            extra,
        }
    }

    fn with(mut self, key: &str, value: f64) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Serialize)]
struct VaccinatedView {
    dose_1: StatsView,
    dose_2: StatsView,
    doses: StatsView,
}

#[derive(Debug, Serialize)]
struct HospitalizedView {
    general: StatsView,
    critical: StatsView,
    ventilator: StatsView,
}

#[derive(Debug, Serialize)]
struct HospitalStaffView {
    infected: StatsView,
    quarantined: StatsView,
}

#[derive(Debug, Serialize)]
struct FailureView {
    metric: ProjectedMetric,
    reason: String,
}

#[derive(Debug, Serialize)]
struct SeriesPointView<'a> {
    date: NaiveDate,
    infected: StatsView,
    dead: StatsView,
    tested: StatsView,
    vaccinated: VaccinatedView,
    hospitalized: HospitalizedView,
    hospital_staff: HospitalStaffView,
    population: PopulationStats,
    projections: &'a [ProjectionPoint],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    projection_failures: Vec<FailureView>,
}

impl<'a> SeriesPointView<'a> {
    fn new(point: &'a SeriesPoint) -> Self {
        let group = |metric: Metric| StatsView::new(point.stats(metric));
        Self {
            date: point.date,
            infected: group(Metric::Infected),
            dead: group(Metric::Dead).with("mortality_percent", point.mortality_percent),
            tested: group(Metric::Tested).with("hit_ratio_percent", point.hit_ratio_percent),
            vaccinated: VaccinatedView {
                dose_1: group(Metric::VaccinatedDose1),
                dose_2: group(Metric::VaccinatedDose2),
                doses: group(Metric::VaccinatedDoses),
            },
            hospitalized: HospitalizedView {
                general: group(Metric::Hospitalized),
                critical: group(Metric::Critical),
                ventilator: group(Metric::Ventilator),
            },
            hospital_staff: HospitalStaffView {
                infected: group(Metric::StaffInfected),
                quarantined: group(Metric::StaffQuarantined),
            },
            population: point.population,
            projections: &point.projections,
            projection_failures: point.projection_failures.iter().map(FailureView::from).collect(),
        }
    }
}

impl From<&ProjectionFailure> for FailureView {
    fn from(failure: &ProjectionFailure) -> Self {
        Self {
            metric: failure.metric,
            reason: failure.error.to_string(),
        }
    }
}

impl Serialize for SeriesPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SeriesPointView::new(self).serialize(serializer)
    }
}
