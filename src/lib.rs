//! `coroner` library crate.
//!
//! Turns sparse, irregularly reported daily epidemic counters into a dense
//! daily series with totals, deltas, moving averages, doubling rates, and
//! polynomial projections. The binary (`coroner`) is a thin wrapper around
//! this library so that:
//!
//! - the engine is testable without spawning processes
//! - a long-running collector can embed `engine::assemble` directly

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
