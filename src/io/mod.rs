//! Input/output helpers for the binary.
//!
//! - raw input JSON ingest (`ingest`)
//! - series exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
