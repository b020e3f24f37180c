//! The series engine.
//!
//! Stages, in pipeline order:
//!
//! - `calendar`: contiguous dates from the first report to today
//! - `reconcile`: one fully populated reading per date (carry-forward rules)
//! - `deltas`: day-over-day changes and cross-metric ratios
//! - `averages`: trailing moving averages of daily deltas
//! - `doubling`: doubling-time estimates
//! - `projection`: polynomial extrapolation with error bands
//!
//! Each stage reads the previous stage's complete output and returns a new
//! collection. `pipeline::assemble` runs them end to end.

pub mod averages;
pub mod calendar;
pub mod deltas;
pub mod doubling;
pub mod pipeline;
pub mod projection;
pub mod reconcile;

pub use pipeline::assemble;
