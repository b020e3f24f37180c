//! Raw per-date partial records.
//!
//! The collector reshapes the upstream feed into a map of ISO date to a partial
//! record. Any field may be missing on any date, and a date may be missing
//! entirely. Cumulative counters can arrive as a running total (`infected`), a
//! daily increment (`infected_new`), or both.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Metric;

/// Raw input for a whole run, keyed and ordered by date.
pub type RawDailyInput = BTreeMap<NaiveDate, RawDay>;

/// One date's partial record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawDay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infected: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infected_new: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead_new: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tested: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tested_new: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccinated_dose_1: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccinated_dose_1_new: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccinated_dose_2: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccinated_dose_2_new: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospitalized: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ventilator: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_infected: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_quarantined: Option<i64>,
}

/// What a raw record says about one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawReading {
    Counter { total: Option<i64>, new: Option<i64> },
    Gauge(Option<i64>),
    /// The metric is computed from other fields and has no raw reading.
    Derived,
}

impl RawDay {
    pub fn reading(&self, metric: Metric) -> RawReading {
        match metric {
            Metric::Infected => RawReading::Counter {
                total: self.infected,
                new: self.infected_new,
            },
            Metric::Dead => RawReading::Counter {
                total: self.dead,
                new: self.dead_new,
            },
            Metric::Tested => RawReading::Counter {
                total: self.tested,
                new: self.tested_new,
            },
            Metric::VaccinatedDose1 => RawReading::Counter {
                total: self.vaccinated_dose_1,
                new: self.vaccinated_dose_1_new,
            },
            Metric::VaccinatedDose2 => RawReading::Counter {
                total: self.vaccinated_dose_2,
                new: self.vaccinated_dose_2_new,
            },
            Metric::VaccinatedDoses => RawReading::Derived,
            Metric::Hospitalized => RawReading::Gauge(self.hospitalized),
            Metric::Critical => RawReading::Gauge(self.critical),
            Metric::Ventilator => RawReading::Gauge(self.ventilator),
            Metric::StaffInfected => RawReading::Gauge(self.staff_infected),
            Metric::StaffQuarantined => RawReading::Gauge(self.staff_quarantined),
        }
    }

    /// The record as it applies to a later date with no report of its own.
    ///
    /// Totals and gauges still describe the state of the world; increments
    /// belong to the day they were reported on and are dropped.
    pub fn carried_forward(&self) -> RawDay {
        RawDay {
            infected_new: None,
            dead_new: None,
            tested_new: None,
            vaccinated_dose_1_new: None,
            vaccinated_dose_2_new: None,
            ..self.clone()
        }
    }
}
