//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the field-identifier table (`Metric`, `MetricTable`) that replaces lookups by name
//! - raw per-date partial records as delivered by the collector (`RawDay`, `RawDailyInput`)
//! - engine outputs (`SeriesPoint`, `ProjectionPoint`) and configuration (`EngineConfig`)
//! - the nested JSON view of a series point (`view`)

pub mod fields;
pub mod raw;
pub mod types;
pub mod view;

pub use fields::*;
pub use raw::*;
pub use types::*;
