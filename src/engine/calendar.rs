//! Calendar construction.

use chrono::NaiveDate;

use crate::domain::RawDailyInput;
use crate::error::EngineError;

/// Every date from the earliest raw record to `max(latest raw record, today)`.
///
/// `today` is passed in rather than read from the clock so runs are
/// reproducible. Dates after the last report are still emitted; the reconciler
/// carries the last known record forward onto them.
pub fn build_calendar(raw: &RawDailyInput, today: NaiveDate) -> Result<Vec<NaiveDate>, EngineError> {
    let (Some((&first, _)), Some((&latest, _))) = (raw.first_key_value(), raw.last_key_value()) else {
        return Err(EngineError::EmptyInput);
    };
    let last = latest.max(today);

    Ok(first.iter_days().take_while(|d| *d <= last).collect())
}
