//! Build configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::period::Period;

/// ARIMA order `(p, d, q)` for the forecasted indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    /// Autoregressive lags.
    pub p: usize,
    /// Differencing passes.
    pub d: usize,
    /// Moving-average lags.
    pub q: usize,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root directory for persisted artifacts.
    pub data_dir: PathBuf,
    /// Artifact key the assembled table is saved/loaded under.
    pub table_key: String,

    /// Keep only observed periods after this one (exclusive cutoff).
    pub start: Period,

    /// Maximum build attempts before falling back to the persisted artifact.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,

    /// ARIMA order for the trade GDP forecast.
    pub arima: ArimaOrder,
    /// Forecast horizon in periods.
    pub horizon: usize,

    /// Seed for the synthetic offline source.
    pub sample_seed: u64,
}
