//! Synthetic outbreak generation.
//!
//! Produces raw input with the defects the real feed has: whole days missing,
//! downward corrections of running totals, and gauges reported as zero when a
//! figure was not published. Useful for demos and for exercising the engine on
//! long, messy histories.

use std::collections::VecDeque;

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Poisson;

use crate::domain::{RawDailyInput, RawDay};
use crate::error::AppError;

/// Days of new cases that make up the current hospital load.
const HOSPITAL_STAY_DAYS: usize = 7;

/// Delay between first and second vaccine dose.
const DOSE_INTERVAL_DAYS: usize = 21;

#[derive(Debug, Clone)]
pub struct OutbreakConfig {
    pub start: NaiveDate,
    pub days: usize,
    pub seed: u64,
    /// Day (from `start`) with the highest expected case count.
    pub peak_day: usize,
    /// Expected new cases on the peak day.
    pub peak_cases: f64,
    /// Width (days) of the epidemic wave.
    pub spread_days: f64,
    /// Day vaccination starts, if within the generated range.
    pub vaccination_day: usize,
    /// Probability a day is missing from the feed entirely.
    pub gap_prob: f64,
    /// Probability the test total is reported below its true value.
    pub correction_prob: f64,
    /// Probability a gauge is reported as zero.
    pub zero_reading_prob: f64,
}

impl Default for OutbreakConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 2, 24).unwrap_or_default(),
            days: 90,
            seed: 42,
            peak_day: 40,
            peak_cases: 250.0,
            spread_days: 12.0,
            vaccination_day: 60,
            gap_prob: 0.08,
            correction_prob: 0.05,
            zero_reading_prob: 0.05,
        }
    }
}

/// Generate a seeded synthetic outbreak.
///
/// The first day is always reported so the calendar starts at `config.start`.
pub fn generate_outbreak(config: &OutbreakConfig) -> Result<RawDailyInput, AppError> {
    if config.days == 0 {
        return Err(AppError::new(2, "Outbreak length must be > 0 days."));
    }
    for (name, p) in [
        ("gap", config.gap_prob),
        ("correction", config.correction_prob),
        ("zero reading", config.zero_reading_prob),
    ] {
        if !(0.0..1.0).contains(&p) {
            return Err(AppError::new(2, format!("Invalid {name} probability {p}; expected [0, 1).")));
        }
    }
    if !(config.peak_cases.is_finite() && config.peak_cases >= 0.0 && config.spread_days > 0.0) {
        return Err(AppError::new(2, "Invalid outbreak wave settings."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut raw = RawDailyInput::new();

    let mut tested_total = 0_i64;
    let mut recent_cases: VecDeque<i64> = VecDeque::with_capacity(HOSPITAL_STAY_DAYS);
    let mut first_doses: Vec<i64> = Vec::new();

    for day in 0..config.days {
        let date = config
            .start
            .checked_add_days(Days::new(day as u64))
            .ok_or_else(|| AppError::new(2, "Outbreak runs past the supported date range."))?;

        let z = (day as f64 - config.peak_day as f64) / config.spread_days;
        let intensity = config.peak_cases * (-0.5 * z * z).exp() + 1.0;

        let cases = poisson(&mut rng, intensity)?;
        let deaths = poisson(&mut rng, intensity * 0.01)?;
        tested_total += poisson(&mut rng, intensity * 25.0 + 150.0)?;

        if recent_cases.len() == HOSPITAL_STAY_DAYS {
            recent_cases.pop_front();
        }
        recent_cases.push_back(cases);
        let hospitalized = (recent_cases.iter().sum::<i64>() as f64 * 0.1).round() as i64;

        let (dose_1, dose_2) = if day >= config.vaccination_day {
            let dose_1 = poisson(&mut rng, 400.0)?;
            first_doses.push(dose_1);
            let due = first_doses.len().checked_sub(DOSE_INTERVAL_DAYS + 1);
            (Some(dose_1), due.map(|i| first_doses[i]))
        } else {
            (None, None)
        };

        if day > 0 && rng.gen_bool(config.gap_prob) {
            continue;
        }

        let mut record = RawDay {
            infected_new: Some(cases),
            dead_new: Some(deaths),
            tested: Some(tested_total),
            vaccinated_dose_1_new: dose_1,
            vaccinated_dose_2_new: dose_2,
            hospitalized: Some(hospitalized),
            critical: Some(hospitalized / 5),
            ventilator: Some(hospitalized / 10),
            staff_infected: Some(cases / 25),
            staff_quarantined: Some(cases / 8),
            ..RawDay::default()
        };

        if rng.gen_bool(config.correction_prob) {
            record.tested = Some(tested_total - poisson(&mut rng, 100.0)?);
        }
        if rng.gen_bool(config.zero_reading_prob) {
            record.hospitalized = Some(0);
        }

        raw.insert(date, record);
    }

    Ok(raw)
}

fn poisson(rng: &mut StdRng, lambda: f64) -> Result<i64, AppError> {
    if !lambda.is_finite() {
        return Err(AppError::new(2, format!("Noise rate must be finite, got {lambda}")));
    }
    let dist = Poisson::new(lambda.max(1e-3))
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;
    let sample: f64 = dist.sample(rng);
    Ok(sample as i64)
}
