//! Command-line parsing.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! engine. Every engine knob can also be set from the environment (or a `.env`
//! file, loaded before parsing).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_POPULATION, ErrorGrowth, HISTORY_LENGTH, PROJECTION_LENGTH, ProjectedMetric};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "coroner", version, about = "Daily epidemic series reconciliation and projection")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assemble a raw input JSON file into the enriched daily series.
    Assemble(AssembleArgs),
    /// Generate a synthetic outbreak and assemble it.
    Demo(DemoArgs),
}

/// Engine settings shared by all commands.
#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Current date (YYYY-MM-DD). Defaults to today at `--utc-offset-hours`.
    #[arg(long, env = "CORONER_TODAY")]
    pub today: Option<NaiveDate>,

    /// Offset of the reporting region from UTC, used to resolve "today".
    #[arg(long, env = "CORONER_UTC_OFFSET_HOURS", default_value_t = 1, allow_hyphen_values = true)]
    pub utc_offset_hours: i32,

    /// Population for per-capita percentages.
    #[arg(long, env = "CORONER_POPULATION", default_value_t = DEFAULT_POPULATION)]
    pub population: i64,

    /// Moving-average window sizes (days).
    #[arg(long, env = "CORONER_WINDOWS", value_delimiter = ',', default_values_t = [3, 5, 7])]
    pub windows: Vec<usize>,

    /// Metrics whose daily delta is averaged (e.g. `infected,hospitalized.general`). Defaults to all.
    #[arg(long = "average", env = "CORONER_AVERAGE", value_delimiter = ',')]
    pub average: Vec<String>,

    /// Metrics that get doubling-rate estimates.
    #[arg(
        long = "doubling",
        env = "CORONER_DOUBLING",
        value_delimiter = ',',
        default_values_t = ["infected".to_string(), "hospitalized.general".to_string(), "hospital_staff.infected".to_string()]
    )]
    pub doubling: Vec<String>,

    /// Predecessors required before a point is projected from.
    #[arg(long, env = "CORONER_HISTORY_LENGTH", default_value_t = HISTORY_LENGTH)]
    pub history_length: usize,

    /// Days projected past each anchor.
    #[arg(long, env = "CORONER_PROJECTION_LENGTH", default_value_t = PROJECTION_LENGTH)]
    pub projection_length: usize,

    /// How error bands widen with distance from the anchor.
    #[arg(long, env = "CORONER_ERROR_GROWTH", value_enum, default_value_t = ErrorGrowth::Exponential)]
    pub error_growth: ErrorGrowth,

    /// Metrics to project. Defaults to all.
    #[arg(long = "project", env = "CORONER_PROJECT", value_enum, value_delimiter = ',')]
    pub project: Vec<ProjectedMetric>,

    /// Write the series document (JSON).
    #[arg(long, value_name = "JSON")]
    pub output: Option<PathBuf>,

    /// Export one row per day to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Print the latest day's projection table.
    #[arg(long)]
    pub projections: bool,
}

#[derive(Debug, Args, Clone)]
pub struct AssembleArgs {
    /// Raw input JSON (ISO date -> partial record).
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of days to generate.
    #[arg(long, default_value_t = 90)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability a day is missing from the feed.
    #[arg(long, default_value_t = 0.08)]
    pub gap_prob: f64,

    /// Save the generated raw input (JSON).
    #[arg(long, value_name = "JSON")]
    pub save_raw: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_assemble_flags() {
        let cli = Cli::try_parse_from([
            "coroner",
            "assemble",
            "--input",
            "raw.json",
            "--today",
            "2021-01-02",
            "--windows",
            "3,7",
            "--project",
            "infected,infected_today",
            "--utc-offset-hours",
            "-5",
        ])
        .unwrap();

        let Command::Assemble(args) = cli.command else {
            panic!("expected assemble");
        };
        assert_eq!(args.input, PathBuf::from("raw.json"));
        assert_eq!(args.engine.today, NaiveDate::from_ymd_opt(2021, 1, 2));
        assert_eq!(args.engine.windows, vec![3, 7]);
        assert_eq!(
            args.engine.project,
            vec![ProjectedMetric::Infected, ProjectedMetric::InfectedToday]
        );
        assert_eq!(args.engine.utc_offset_hours, -5);
        assert_eq!(args.engine.history_length, HISTORY_LENGTH);
    }
}
