//! Raw input ingest.
//!
//! Reads the collector's reshaped feed: a JSON object mapping ISO dates to
//! partial records.
//!
//! ```json
//! {
//!   "2021-01-01": { "infected_new": 10, "hospitalized": 3 },
//!   "2021-01-02": { "infected_new": 5, "tested": 1200 }
//! }
//! ```
//!
//! Unknown field names are rejected rather than silently dropped.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::RawDailyInput;
use crate::error::AppError;

/// Load raw input from a JSON file.
pub fn load_raw_input(path: &Path) -> Result<RawDailyInput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(4, format!("Failed to open raw input '{}': {e}", path.display())))?;
    let raw: RawDailyInput = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid raw input '{}': {e}", path.display())))?;

    tracing::debug!(path = %path.display(), dates = raw.len(), "raw input loaded");
    Ok(raw)
}

/// Parse raw input from a JSON string.
pub fn parse_raw_input(json: &str) -> Result<RawDailyInput, AppError> {
    serde_json::from_str(json).map_err(|e| AppError::new(2, format!("Invalid raw input: {e}")))
}

/// Write raw input as pretty JSON (used to save generated outbreaks).
pub fn write_raw_input(path: &Path, raw: &RawDailyInput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create raw input '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, raw)
        .map_err(|e| AppError::new(4, format!("Failed to write raw input: {e}")))?;
    Ok(())
}
