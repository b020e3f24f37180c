//! Terminal reporting.
//!
//! Formatting lives here so engine code stays free of presentation concerns.

pub mod format;

pub use format::*;
