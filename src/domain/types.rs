//! Shared domain types.
//!
//! These types are intentionally kept lightweight so each pipeline stage can
//! produce a fresh collection of them from the previous stage's output.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{Metric, MetricTable};
use crate::error::EngineError;

/// Population of the reporting region, used for per-capita percentages.
pub const DEFAULT_POPULATION: i64 = 5_367_580;

/// Number of predecessors a point needs before it is projected from.
pub const HISTORY_LENGTH: usize = 14;

/// Number of days projected beyond the anchor.
pub const PROJECTION_LENGTH: usize = 7;

/// Output of the reconciler: one fully populated set of readings per day.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledDay {
    pub date: NaiveDate,
    pub values: MetricTable<i64>,
}

impl ReconciledDay {
    /// Synthetic all-zero predecessor of the first calendar date.
    pub fn day_zero(date: NaiveDate) -> Self {
        Self {
            date,
            values: MetricTable::default(),
        }
    }
}

/// Trailing mean of a metric's daily delta over `window` days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAverage {
    pub window: usize,
    pub value: f64,
}

/// Derived daily statistics for one metric on one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricStats {
    /// Cumulative total (counters) or current reading (snapshots).
    pub total: i64,
    pub today: i64,
    pub yesterday: i64,
    pub change_percent: f64,
    pub daily_diff: i64,
    pub daily_diff_percent: f64,
    pub moving_averages: Vec<MovingAverage>,
    pub doubling_rate: Option<f64>,
    pub doubling_rate_from_mov_avg_3: Option<f64>,
}

impl MetricStats {
    pub fn moving_average(&self, window: usize) -> Option<f64> {
        self.moving_averages
            .iter()
            .find(|ma| ma.window == window)
            .map(|ma| ma.value)
    }
}

/// Per-capita percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PopulationStats {
    pub total: i64,
    pub infected_percent: f64,
    pub tested_percent: f64,
    pub vaccinated_percent: f64,
    pub vaccinated_full_percent: f64,
}

/// One calendar day of the assembled series.
///
/// Points are identified and ordered by `date` alone.
#[derive(Debug, Clone)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub metrics: MetricTable<MetricStats>,
    /// Positive tests relative to tests taken today.
    pub hit_ratio_percent: f64,
    pub mortality_percent: f64,
    pub population: PopulationStats,
    pub projections: Vec<ProjectionPoint>,
    pub projection_failures: Vec<ProjectionFailure>,
}

impl SeriesPoint {
    pub fn stats(&self, metric: Metric) -> &MetricStats {
        &self.metrics[metric]
    }

    pub fn total(&self, metric: Metric) -> i64 {
        self.metrics[metric].total
    }

    pub fn today(&self, metric: Metric) -> i64 {
        self.metrics[metric].today
    }
}

impl PartialEq for SeriesPoint {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}

impl Eq for SeriesPoint {}

impl PartialOrd for SeriesPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeriesPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}

/// Metrics the projection engine can extrapolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ProjectedMetric {
    /// Cumulative infections.
    Infected,
    /// Cumulative deaths.
    Dead,
    /// Daily new infections.
    InfectedToday,
    /// Current general hospitalizations.
    Hospitalized,
}

impl ProjectedMetric {
    pub const ALL: [ProjectedMetric; 4] = [
        ProjectedMetric::Infected,
        ProjectedMetric::Dead,
        ProjectedMetric::InfectedToday,
        ProjectedMetric::Hospitalized,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProjectedMetric::Infected => "infected",
            ProjectedMetric::Dead => "dead",
            ProjectedMetric::InfectedToday => "infected_today",
            ProjectedMetric::Hospitalized => "hospitalized",
        }
    }

    /// The historical value this metric is fitted against.
    pub fn observe(self, point: &SeriesPoint) -> i64 {
        match self {
            ProjectedMetric::Infected => point.total(Metric::Infected),
            ProjectedMetric::Dead => point.total(Metric::Dead),
            ProjectedMetric::InfectedToday => point.today(Metric::Infected),
            ProjectedMetric::Hospitalized => point.total(Metric::Hospitalized),
        }
    }
}

impl fmt::Display for ProjectedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectedMetric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectedMetric::ALL
            .into_iter()
            .find(|m| m.name() == s.trim())
            .ok_or_else(|| EngineError::missing_field(s.trim()))
    }
}

/// Central estimate with its uncertainty band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// One projected day, strictly after its anchor point's date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub estimates: BTreeMap<ProjectedMetric, Estimate>,
}

/// A projection that could not be computed for one metric of one anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionFailure {
    pub metric: ProjectedMetric,
    pub error: EngineError,
}

/// How the error band widens with distance from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorGrowth {
    /// `central * (1 ± e)^k` for day offset `k`.
    Exponential,
    /// `central * (1 ± e)` for every offset.
    Flat,
}

/// How one metric is projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionTarget {
    pub metric: ProjectedMetric,
    /// Polynomial degree of the least-squares fit.
    pub degree: usize,
    /// Projected values may never fall below the last known value, nor below
    /// the previous projected day.
    pub non_declining: bool,
}

impl ProjectionTarget {
    /// Default fit settings: counters that cannot decline use a cubic fit,
    /// gauges and daily counts use a quartic one.
    pub fn default_for(metric: ProjectedMetric) -> Self {
        let non_declining = matches!(metric, ProjectedMetric::Infected | ProjectedMetric::Dead);
        Self {
            metric,
            degree: if non_declining { 3 } else { 4 },
            non_declining,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub history_length: usize,
    pub projection_length: usize,
    pub error_growth: ErrorGrowth,
    pub targets: Vec<ProjectionTarget>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            history_length: HISTORY_LENGTH,
            projection_length: PROJECTION_LENGTH,
            error_growth: ErrorGrowth::Exponential,
            targets: ProjectedMetric::ALL
                .into_iter()
                .map(ProjectionTarget::default_for)
                .collect(),
        }
    }
}

/// Everything the engine needs besides the raw input and the current date.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub population: i64,
    /// Window sizes (days) for the trailing moving averages.
    pub moving_average_windows: Vec<NonZeroUsize>,
    /// Metrics whose daily delta is averaged.
    pub moving_average_metrics: Vec<Metric>,
    /// Metrics that get a doubling-rate estimate.
    pub doubling_metrics: Vec<Metric>,
    pub projection: ProjectionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION,
            moving_average_windows: [3, 5, 7].into_iter().filter_map(NonZeroUsize::new).collect(),
            moving_average_metrics: Metric::ALL.to_vec(),
            doubling_metrics: vec![Metric::Infected, Metric::Hospitalized, Metric::StaffInfected],
            projection: ProjectionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Check that every projection target can be fitted from the configured history.
    ///
    /// A fit of degree `d` needs at least `d + 1` points; the window holds
    /// `history_length + 1`.
    pub fn validate(&self) -> Result<(), EngineError> {
        let window = self.projection.history_length + 1;
        for target in &self.projection.targets {
            if window < target.degree + 1 {
                return Err(EngineError::projection_input(
                    target.metric.name(),
                    format!(
                        "history window of {window} points cannot fit a degree {} polynomial",
                        target.degree
                    ),
                ));
            }
        }
        Ok(())
    }
}
