//! Export the assembled series.
//!
//! - JSON: the document the serving side publishes, `{ updated, current, history }`
//! - CSV: one row per day with the headline fields, for spreadsheets

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::domain::{Metric, SeriesPoint};
use crate::error::AppError;

/// The published series document.
#[derive(Debug, Serialize)]
pub struct SeriesDocument<'a> {
    pub updated: DateTime<FixedOffset>,
    pub current: Option<&'a SeriesPoint>,
    pub history: &'a [SeriesPoint],
}

impl<'a> SeriesDocument<'a> {
    pub fn new(points: &'a [SeriesPoint], updated: DateTime<FixedOffset>) -> Self {
        Self {
            updated,
            current: points.last(),
            history: points,
        }
    }
}

/// Write the series document as pretty JSON.
pub fn write_series_json(path: &Path, document: &SeriesDocument<'_>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create series JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), document)
        .map_err(|e| AppError::new(4, format!("Failed to write series JSON: {e}")))?;
    Ok(())
}

/// Metrics exported as `<name>_total,<name>_today` column pairs.
const CSV_METRICS: [Metric; 6] = [
    Metric::Infected,
    Metric::Dead,
    Metric::Tested,
    Metric::VaccinatedDoses,
    Metric::Hospitalized,
    Metric::Critical,
];

/// Write one CSV row per day.
pub fn write_series_csv(path: &Path, points: &[SeriesPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    let write_err = |e: std::io::Error| AppError::new(4, format!("Failed to write export CSV: {e}"));

    let mut header = vec!["date".to_string()];
    for metric in CSV_METRICS {
        let name = metric.name().replace('.', "_");
        header.push(format!("{name}_total"));
        header.push(format!("{name}_today"));
    }
    header.extend(["hit_ratio_percent", "mortality_percent", "infected_doubling_rate"].map(String::from));
    writeln!(out, "{}", header.join(",")).map_err(write_err)?;

    for p in points {
        let mut row = vec![p.date.to_string()];
        for metric in CSV_METRICS {
            row.push(p.total(metric).to_string());
            row.push(p.today(metric).to_string());
        }
        row.push(format!("{:.2}", p.hit_ratio_percent));
        row.push(format!("{:.3}", p.mortality_percent));
        row.push(
            p.stats(Metric::Infected)
                .doubling_rate
                .map(|r| format!("{r:.2}"))
                .unwrap_or_default(),
        );
        writeln!(out, "{}", row.join(",")).map_err(write_err)?;
    }

    out.flush().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::domain::{EngineConfig, RawDailyInput, RawDay};
    use crate::engine::assemble;

    fn series() -> Vec<SeriesPoint> {
        let raw: RawDailyInput = [
            (
                NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                RawDay {
                    infected_new: Some(10),
                    ..RawDay::default()
                },
            ),
            (
                NaiveDate::from_ymd_opt(2021, 1, 2).unwrap(),
                RawDay {
                    infected_new: Some(5),
                    ..RawDay::default()
                },
            ),
        ]
        .into();
        assemble(&raw, &EngineConfig::default(), NaiveDate::from_ymd_opt(2021, 1, 2).unwrap()).unwrap()
    }

    fn updated() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2021, 1, 2, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn json_document_has_current_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.json");
        let points = series();

        write_series_json(&path, &SeriesDocument::new(&points, updated())).unwrap();

        let json: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(json["updated"], "2021-01-02T12:00:00+01:00");
        assert_eq!(json["current"]["date"], "2021-01-02");
        assert_eq!(json["current"]["infected"]["total"], 15);
        assert_eq!(json["history"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn csv_has_header_and_one_row_per_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");

        write_series_csv(&path, &series()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,infected_total,infected_today,dead_total"));
        assert!(lines[0].contains("vaccinated_doses_total"));
        assert!(lines[2].starts_with("2021-01-02,15,5,"));
    }
}
