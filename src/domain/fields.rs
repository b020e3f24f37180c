//! Field identifiers.
//!
//! Every per-day quantity the engine tracks is named by a [`Metric`]. Stages that
//! are generic over fields (moving averages, doubling rates) iterate these
//! identifiers and index a [`MetricTable`], so a reference to a field that does
//! not exist is a compile error rather than a runtime lookup miss. The only place
//! names are resolved at runtime is configuration parsing (`Metric::from_str`).

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::EngineError;

/// How a field behaves over time and which reconciliation rule applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Running total; non-decreasing. Monotonic-counter rule.
    Cumulative,
    /// Point-in-time gauge that may rise or fall. Last-valid rule.
    Snapshot,
    /// Computed from other reconciled fields, never read from raw input.
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Infected,
    Dead,
    Tested,
    VaccinatedDose1,
    VaccinatedDose2,
    /// Sum of both vaccine doses.
    VaccinatedDoses,
    Hospitalized,
    Critical,
    Ventilator,
    StaffInfected,
    StaffQuarantined,
}

impl Metric {
    pub const COUNT: usize = 11;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Infected,
        Metric::Dead,
        Metric::Tested,
        Metric::VaccinatedDose1,
        Metric::VaccinatedDose2,
        Metric::VaccinatedDoses,
        Metric::Hospitalized,
        Metric::Critical,
        Metric::Ventilator,
        Metric::StaffInfected,
        Metric::StaffQuarantined,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            Metric::Infected
            | Metric::Dead
            | Metric::Tested
            | Metric::VaccinatedDose1
            | Metric::VaccinatedDose2 => FieldKind::Cumulative,
            Metric::VaccinatedDoses => FieldKind::Derived,
            Metric::Hospitalized
            | Metric::Critical
            | Metric::Ventilator
            | Metric::StaffInfected
            | Metric::StaffQuarantined => FieldKind::Snapshot,
        }
    }

    /// Dotted path of the metric's group in the serialized series.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Infected => "infected",
            Metric::Dead => "dead",
            Metric::Tested => "tested",
            Metric::VaccinatedDose1 => "vaccinated.dose_1",
            Metric::VaccinatedDose2 => "vaccinated.dose_2",
            Metric::VaccinatedDoses => "vaccinated.doses",
            Metric::Hospitalized => "hospitalized.general",
            Metric::Critical => "hospitalized.critical",
            Metric::Ventilator => "hospitalized.ventilator",
            Metric::StaffInfected => "hospital_staff.infected",
            Metric::StaffQuarantined => "hospital_staff.quarantined",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = EngineError;

    /// Accepts the dotted group path (`hospitalized.general`) and tolerates a
    /// trailing `.today`, which is how the daily-delta fields are usually named.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        let key = key.strip_suffix(".today").unwrap_or(key);
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == key)
            .ok_or_else(|| EngineError::missing_field(s.trim()))
    }
}

/// A value for every [`Metric`], indexed by the metric itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable<T>([T; Metric::COUNT]);

impl<T> MetricTable<T> {
    pub fn from_fn(f: impl FnMut(Metric) -> T) -> Self {
        Self(Metric::ALL.map(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &T)> {
        Metric::ALL.into_iter().zip(self.0.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Metric, &T) -> U) -> MetricTable<U> {
        MetricTable::from_fn(|m| f(m, &self[m]))
    }
}

impl<T: Default> Default for MetricTable<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Metric> for MetricTable<T> {
    type Output = T;

    fn index(&self, metric: Metric) -> &T {
        &self.0[metric.index()]
    }
}

impl<T> IndexMut<Metric> for MetricTable<T> {
    fn index_mut(&mut self, metric: Metric) -> &mut T {
        &mut self.0[metric.index()]
    }
}
