//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments into an `EngineConfig`
//! - resolves "today" in the reporting region's timezone
//! - loads (or generates) raw input and assembles the series
//! - prints reports and writes optional outputs

use std::num::NonZeroUsize;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{AssembleArgs, Command, DemoArgs, EngineArgs};
use crate::data::{OutbreakConfig, generate_outbreak};
use crate::domain::{EngineConfig, Metric, ProjectedMetric, ProjectionConfig, ProjectionTarget, RawDailyInput};
use crate::engine::assemble;
use crate::error::{AppError, EngineError};
use crate::io::{SeriesDocument, load_raw_input, write_raw_input, write_series_csv, write_series_json};
use crate::report::{format_projections, format_summary};

/// Entry point for the `coroner` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Assemble(args) => handle_assemble(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coroner=info"));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_assemble(args: AssembleArgs) -> Result<(), AppError> {
    let raw = load_raw_input(&args.input)?;
    run_engine(&raw, &args.engine)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let outbreak = OutbreakConfig {
        days: args.days,
        seed: args.seed,
        gap_prob: args.gap_prob,
        ..OutbreakConfig::default()
    };
    let raw = generate_outbreak(&outbreak)?;
    tracing::info!(days = outbreak.days, seed = outbreak.seed, reported = raw.len(), "synthetic outbreak generated");

    if let Some(path) = &args.save_raw {
        write_raw_input(path, &raw)?;
        tracing::info!(path = %path.display(), "raw input saved");
    }

    // Without an explicit date, a demo ends on its last generated day rather than today.
    let mut engine = args.engine.clone();
    if engine.today.is_none() {
        engine.today = raw.keys().next_back().copied();
    }
    run_engine(&raw, &engine)
}

fn run_engine(raw: &RawDailyInput, args: &EngineArgs) -> Result<(), AppError> {
    let config = engine_config_from_args(args)?;
    let now = now_at_offset(args.utc_offset_hours)?;
    let today = resolve_today(args.today, now);

    tracing::info!(dates = raw.len(), %today, "assembling series");
    let points = assemble(raw, &config, today)?;

    print!("{}", format_summary(&points));
    if args.projections {
        if let Some(latest) = points.last() {
            print!("{}", format_projections(latest));
        }
    }

    if let Some(path) = &args.output {
        write_series_json(path, &SeriesDocument::new(&points, now))?;
        tracing::info!(path = %path.display(), "series document written");
    }
    if let Some(path) = &args.export {
        write_series_csv(path, &points)?;
        tracing::info!(path = %path.display(), "series CSV written");
    }

    Ok(())
}

/// Current time in the reporting region.
pub fn now_at_offset(utc_offset_hours: i32) -> Result<DateTime<FixedOffset>, AppError> {
    let offset = FixedOffset::east_opt(utc_offset_hours.saturating_mul(3600))
        .ok_or_else(|| AppError::new(2, format!("Invalid UTC offset: {utc_offset_hours}h.")))?;
    Ok(Utc::now().with_timezone(&offset))
}

/// Build and validate the engine configuration from CLI/env settings.
pub fn engine_config_from_args(args: &EngineArgs) -> Result<EngineConfig, AppError> {
    if args.population <= 0 {
        return Err(AppError::new(2, "Population must be > 0."));
    }

    let moving_average_windows = args
        .windows
        .iter()
        .map(|&w| NonZeroUsize::new(w).ok_or_else(|| AppError::new(2, "Moving-average windows must be > 0.")))
        .collect::<Result<Vec<_>, _>>()?;

    let moving_average_metrics = if args.average.is_empty() {
        Metric::ALL.to_vec()
    } else {
        parse_metrics(&args.average)?
    };

    let project: Vec<ProjectedMetric> = if args.project.is_empty() {
        ProjectedMetric::ALL.to_vec()
    } else {
        let mut project = args.project.clone();
        project.sort();
        project.dedup();
        project
    };

    let config = EngineConfig {
        population: args.population,
        moving_average_windows,
        moving_average_metrics,
        doubling_metrics: parse_metrics(&args.doubling)?,
        projection: ProjectionConfig {
            history_length: args.history_length,
            projection_length: args.projection_length,
            error_growth: args.error_growth,
            targets: project.into_iter().map(ProjectionTarget::default_for).collect(),
        },
    };
    config.validate()?;
    Ok(config)
}

fn parse_metrics(names: &[String]) -> Result<Vec<Metric>, EngineError> {
    names.iter().map(|n| n.parse::<Metric>()).collect()
}

/// Resolve the date the calendar runs up to.
pub fn resolve_today(explicit: Option<NaiveDate>, now: DateTime<FixedOffset>) -> NaiveDate {
    explicit.unwrap_or_else(|| now.date_naive())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::cli::Cli;

    fn engine_args(extra: &[&str]) -> EngineArgs {
        let mut argv = vec!["coroner", "assemble", "--input", "raw.json"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Assemble(args) => args.engine,
            Command::Demo(args) => args.engine,
        }
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let config = engine_config_from_args(&engine_args(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn unknown_average_field_is_rejected() {
        let err = engine_config_from_args(&engine_args(&["--average", "infected,recovered"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("recovered"));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = engine_config_from_args(&engine_args(&["--windows", "0"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn short_history_is_rejected() {
        let err = engine_config_from_args(&engine_args(&["--history-length", "2"])).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn today_follows_region_offset() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        // 23:30 UTC on Jan 1 is already Jan 2 at UTC+1.
        let now = Utc.with_ymd_and_hms(2021, 1, 1, 23, 30, 0).unwrap().with_timezone(&offset);
        assert_eq!(resolve_today(None, now), NaiveDate::from_ymd_opt(2021, 1, 2).unwrap());

        let pinned = NaiveDate::from_ymd_opt(2020, 6, 1);
        assert_eq!(resolve_today(pinned, now), pinned.unwrap());
        assert!(now_at_offset(100).is_err());
    }
}
