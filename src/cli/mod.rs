//! Command-line parsing for the macro dataset builder.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the projection/assembly code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mf", version, about = "Quarterly macro dataset builder (IBGE + Focus survey)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the dataset (with retries and fallback), print a summary, and persist it.
    Build(BuildArgs),
    /// Print the tail of the last persisted dataset without rebuilding.
    Show(ShowArgs),
    /// Export the last persisted dataset to CSV.
    Export(ExportArgs),
}

/// Options for a dataset build.
#[derive(Debug, Parser, Clone)]
pub struct BuildArgs {
    /// Directory for persisted dataset artifacts.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Artifact key the dataset is saved under.
    #[arg(long, default_value = "dataset")]
    pub key: String,

    /// Keep only observed periods after this one (YYYY-MM, exclusive).
    #[arg(long, default_value = "2013-12")]
    pub start: String,

    /// Maximum build attempts before falling back to the persisted dataset.
    #[arg(long, default_value_t = 3)]
    pub attempts: u32,

    /// Delay between attempts, in seconds.
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// Use the deterministic offline source instead of the live APIs.
    #[arg(long)]
    pub offline: bool,

    /// Seed for the offline source.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// ARIMA autoregressive order for the trade GDP forecast.
    #[arg(long, default_value_t = 2)]
    pub arima_p: usize,

    /// ARIMA differencing order.
    #[arg(long, default_value_t = 1)]
    pub arima_d: usize,

    /// ARIMA moving-average order.
    #[arg(long, default_value_t = 2)]
    pub arima_q: usize,

    /// Forecast horizon in periods.
    #[arg(long, default_value_t = 8)]
    pub horizon: usize,

    /// Rows of the assembled table to print after the summary.
    #[arg(long, default_value_t = 12)]
    pub tail: usize,

    /// Also export the built dataset to this CSV path.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for printing a persisted dataset.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Directory for persisted dataset artifacts.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Artifact key to load.
    #[arg(long, default_value = "dataset")]
    pub key: String,

    /// Rows to print.
    #[arg(long, default_value_t = 12)]
    pub tail: usize,
}

/// Options for exporting a persisted dataset.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Directory for persisted dataset artifacts.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Artifact key to load.
    #[arg(long, default_value = "dataset")]
    pub key: String,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}
