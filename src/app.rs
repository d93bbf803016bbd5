//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the resilient build pipeline
//! - prints the summary and table tail
//! - writes optional exports

use std::time::Duration;

use clap::Parser;

use crate::cli::{BuildArgs, Command, ExportArgs, ShowArgs};
use crate::data::{ApiSource, SampleSource};
use crate::domain::{ArimaOrder, BuildConfig, Period};
use crate::error::PipelineError;
use crate::io::store::TableStore;

pub mod pipeline;

/// Entry point for the `mf` binary.
pub fn run() -> Result<(), PipelineError> {
    // We want `mf` and `mf --offline` to behave like `mf build ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Build(args) => handle_build(args),
        Command::Show(args) => handle_show(args),
        Command::Export(args) => handle_export(args),
    }
}

fn handle_build(args: BuildArgs) -> Result<(), PipelineError> {
    let config = build_config_from_args(&args)?;

    let outcome = if args.offline {
        let source = SampleSource::new(config.sample_seed);
        pipeline::run_resilient(&source, &config)?
    } else {
        let source = ApiSource::new()?;
        pipeline::run_resilient(&source, &config)?
    };

    println!("{}", crate::report::format_build_summary(&outcome, &config));
    if args.tail > 0 {
        println!("{}", crate::report::format_table_tail(&outcome.table, args.tail));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_table_csv(path, &outcome.table)?;
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), PipelineError> {
    let store = TableStore::new(&args.data_dir);
    let table = store.load(&args.key)?;
    println!("{}", crate::report::format_table_tail(&table, args.tail));
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), PipelineError> {
    let store = TableStore::new(&args.data_dir);
    let table = store.load(&args.key)?;
    crate::io::export::write_table_csv(&args.out, &table)?;
    println!("Exported {} rows to {}", table.n_rows(), args.out.display());
    Ok(())
}

pub fn build_config_from_args(args: &BuildArgs) -> Result<BuildConfig, PipelineError> {
    Ok(BuildConfig {
        data_dir: args.data_dir.clone(),
        table_key: args.key.clone(),
        start: parse_period_arg(&args.start)?,
        max_attempts: args.attempts.max(1),
        retry_delay: Duration::from_secs(args.retry_delay),
        arima: ArimaOrder {
            p: args.arima_p,
            d: args.arima_d,
            q: args.arima_q,
        },
        horizon: args.horizon,
        sample_seed: args.seed,
    })
}

/// Parse a `YYYY-MM` period flag.
fn parse_period_arg(raw: &str) -> Result<Period, PipelineError> {
    let (year, month) = raw
        .split_once('-')
        .ok_or_else(|| PipelineError::Config(format!("invalid period '{raw}' (expected YYYY-MM)")))?;
    let year: i32 = year
        .parse()
        .map_err(|_| PipelineError::Config(format!("invalid period '{raw}' (expected YYYY-MM)")))?;
    let month: u32 = month
        .parse()
        .map_err(|_| PipelineError::Config(format!("invalid period '{raw}' (expected YYYY-MM)")))?;
    Period::from_month(year, month)
        .map_err(|_| PipelineError::Config(format!("invalid period '{raw}' (expected YYYY-MM)")))
}

/// Rewrite argv so `mf` defaults to `mf build`.
///
/// Rules:
/// - `mf`                      -> `mf build`
/// - `mf --offline ...`        -> `mf build --offline ...`
/// - `mf --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("build".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "build" | "show" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "build flags".
    if arg1.starts_with('-') {
        argv.insert(1, "build".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
