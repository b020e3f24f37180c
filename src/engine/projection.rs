//! Polynomial projections with empirical error bands.
//!
//! For each anchor point with at least `history_length` predecessors and each
//! projection target:
//!
//! 1. take the trailing `history_length + 1` points ending at the anchor
//! 2. least-squares fit a polynomial of the target's degree against day index
//! 3. extrapolate `projection_length` days past the anchor (rounded)
//! 4. take the median in-sample relative residual as the error rate `e`
//! 5. band each day `k` as `central * (1 ± e)^k` (or `(1 ± e)` when flat)
//! 6. for non-declining targets, clamp central and lower values to the anchor's
//!    value and to the previous projected day
//! 7. floor everything at zero
//!
//! Anchors are independent and are fitted in parallel. A failed fit is recorded
//! on the anchor for that metric only; the other metrics and the point's
//! historical fields are unaffected.

use std::collections::BTreeMap;

use chrono::Days;
use rayon::prelude::*;

use crate::domain::{
    ErrorGrowth, Estimate, ProjectionConfig, ProjectionFailure, ProjectionPoint, ProjectionTarget, SeriesPoint,
};
use crate::error::EngineError;
use crate::math::{eval_polynomial, fit_polynomial, median};

/// Projection of one metric from one anchor, one estimate per future day.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricProjection {
    pub error_rate: f64,
    pub estimates: Vec<Estimate>,
}

/// Attach projections to every point with enough history.
pub fn compute_projections(points: Vec<SeriesPoint>, config: &ProjectionConfig) -> Vec<SeriesPoint> {
    let history = config.history_length;

    let projected: Vec<(Vec<ProjectionPoint>, Vec<ProjectionFailure>)> = (0..points.len())
        .into_par_iter()
        .map(|i| {
            if i < history {
                (Vec::new(), Vec::new())
            } else {
                project_anchor(&points[i - history..=i], config)
            }
        })
        .collect();

    points
        .into_iter()
        .zip(projected)
        .map(|(mut point, (projections, failures))| {
            for failure in &failures {
                tracing::warn!(date = %point.date, metric = %failure.metric, "{}", failure.error);
            }
            point.projections = projections;
            point.projection_failures = failures;
            point
        })
        .collect()
}

/// Project every target from the last point of `window`.
fn project_anchor(
    window: &[SeriesPoint],
    config: &ProjectionConfig,
) -> (Vec<ProjectionPoint>, Vec<ProjectionFailure>) {
    let Some(anchor) = window.last() else {
        return (Vec::new(), Vec::new());
    };

    let mut by_day: Vec<BTreeMap<_, Estimate>> = vec![BTreeMap::new(); config.projection_length];
    let mut failures = Vec::new();

    for target in &config.targets {
        let history: Vec<i64> = window.iter().map(|p| target.metric.observe(p)).collect();
        match project_metric(&history, target, config.projection_length, config.error_growth) {
            Ok(projection) => {
                for (day, estimate) in by_day.iter_mut().zip(projection.estimates) {
                    day.insert(target.metric, estimate);
                }
            }
            Err(error) => failures.push(ProjectionFailure {
                metric: target.metric,
                error,
            }),
        }
    }

    if by_day.iter().all(BTreeMap::is_empty) {
        return (Vec::new(), failures);
    }

    let projections = by_day
        .into_iter()
        .enumerate()
        .filter_map(|(k, estimates)| {
            let date = anchor.date.checked_add_days(Days::new(k as u64 + 1))?;
            Some(ProjectionPoint { date, estimates })
        })
        .collect();

    (projections, failures)
}

/// Fit `history` (oldest first, anchor last) and extrapolate `horizon` days.
pub fn project_metric(
    history: &[i64],
    target: &ProjectionTarget,
    horizon: usize,
    growth: ErrorGrowth,
) -> Result<MetricProjection, EngineError> {
    let metric = target.metric.name();
    let n = history.len();
    if n < 2 || n < target.degree + 1 {
        return Err(EngineError::projection_input(
            metric,
            format!(
                "{n} historical points cannot determine a degree {} polynomial",
                target.degree
            ),
        ));
    }

    // Day indices scaled to [0, 1] over the window.
    let span = (n - 1) as f64;
    let xs: Vec<f64> = (0..n).map(|j| j as f64 / span).collect();
    let ys: Vec<f64> = history.iter().map(|&v| v as f64).collect();

    let coeffs = fit_polynomial(&xs, &ys, target.degree)
        .ok_or_else(|| EngineError::projection_input(metric, "least-squares fit is ill-conditioned"))?;

    let residuals: Vec<f64> = xs
        .iter()
        .zip(history)
        .map(|(&x, &observed)| ((observed as f64 - eval_polynomial(&coeffs, x)) / observed.max(1) as f64).abs())
        .collect();
    let error_rate = median(&residuals)
        .filter(|e| e.is_finite())
        .ok_or_else(|| EngineError::projection_input(metric, "residuals are not finite"))?;

    let last_known = history[n - 1] as f64;
    let mut previous: Option<Estimate> = None;
    let mut estimates = Vec::with_capacity(horizon);

    for k in 1..=horizon {
        let x = (n - 1 + k) as f64 / span;
        let mut value = eval_polynomial(&coeffs, x).round();
        if !value.is_finite() {
            return Err(EngineError::projection_input(metric, "extrapolation is not finite"));
        }

        if target.non_declining {
            value = value.max(last_known);
            if let Some(prev) = previous {
                value = value.max(prev.value);
            }
        }

        let steps = match growth {
            ErrorGrowth::Exponential => k as i32,
            ErrorGrowth::Flat => 1,
        };
        let mut upper = (value * (1.0 + error_rate).powi(steps)).round();
        let mut lower = (value * (1.0 - error_rate).max(0.0).powi(steps)).round();

        if target.non_declining {
            lower = lower.max(last_known);
            if let Some(prev) = previous {
                lower = lower.max(prev.lower);
            }
        }
        lower = lower.min(value);
        upper = upper.max(value);

        let estimate = Estimate {
            value: value.max(0.0),
            lower: lower.max(0.0),
            upper: upper.max(0.0),
        };
        estimates.push(estimate);
        previous = Some(estimate);
    }

    Ok(MetricProjection { error_rate, estimates })
}
