//! The build pipeline: fetch -> project/forecast -> assemble, with retries.
//!
//! `run_once` is one clean pass over the indicator catalog. `run_resilient`
//! wraps it in the recovery policy: bounded retries with a fixed delay for
//! transient failures, an immediate stop for fatal ones (alignment and
//! configuration errors do not improve on retry), and a fallback to the last
//! persisted table when every attempt fails.

use std::path::PathBuf;
use std::thread;

use rayon::prelude::*;

use crate::assemble::{self, IndicatorColumn};
use crate::data::DataSource;
use crate::domain::{AssembledTable, BuildConfig};
use crate::error::PipelineError;
use crate::features;
use crate::io::store::TableStore;

/// Where the returned table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Built this run from freshly fetched data.
    Fresh,
    /// Loaded from the persisted artifact after all attempts failed.
    Fallback,
}

/// Result of a resilient build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub table: AssembledTable,
    pub provenance: Provenance,
    /// Where a fresh table was saved; `None` on fallback.
    pub saved_to: Option<PathBuf>,
}

/// One full build pass: every indicator column, then assembly.
///
/// Indicators are independent of each other, so they build in parallel; the
/// first error wins and propagates to the retry boundary.
pub fn run_once(
    source: &dyn DataSource,
    config: &BuildConfig,
) -> Result<AssembledTable, PipelineError> {
    let specs = features::default_indicators();
    let columns: Vec<IndicatorColumn> = specs
        .par_iter()
        .map(|spec| features::build_indicator(spec, source, config))
        .collect::<Result<_, _>>()?;

    assemble::assemble(&columns)
}

/// Build with retries and fallback.
///
/// A fresh success persists the table before returning; saving is part of the
/// attempt, so a save failure counts as a failed attempt rather than aborting
/// the run. After `config.max_attempts` failures, the last persisted table is
/// returned instead; only when no artifact exists does the run fail with
/// `AttemptsExhausted`.
pub fn run_resilient(
    source: &dyn DataSource,
    config: &BuildConfig,
) -> Result<BuildOutcome, PipelineError> {
    let store = TableStore::new(&config.data_dir);
    let mut last_error: Option<PipelineError> = None;

    for attempt in 1..=config.max_attempts {
        let result = run_once(source, config).and_then(|table| {
            let saved = store.save(&config.table_key, &table)?;
            Ok(BuildOutcome {
                table,
                provenance: Provenance::Fresh,
                saved_to: Some(saved),
            })
        });
        match result {
            Ok(outcome) => return Ok(outcome),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                eprintln!(
                    "build attempt {attempt}/{} failed: {err}",
                    config.max_attempts
                );
                last_error = Some(err);
                if attempt < config.max_attempts {
                    thread::sleep(config.retry_delay);
                }
            }
        }
    }

    match store.load(&config.table_key) {
        Ok(table) => Ok(BuildOutcome {
            table,
            provenance: Provenance::Fallback,
            saved_to: None,
        }),
        Err(PipelineError::NotFound(_)) => Err(PipelineError::AttemptsExhausted {
            attempts: config.max_attempts,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts were made".to_string()),
        }),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ExpectationId, ObservedId, SampleSource};
    use crate::domain::{ArimaOrder, ExpectationSeries, ObservedSeries, Period};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn config_in(dir: &std::path::Path) -> BuildConfig {
        BuildConfig {
            data_dir: dir.to_path_buf(),
            table_key: "dataset".to_string(),
            start: Period::from_month(2013, 12).unwrap(),
            max_attempts: 3,
            retry_delay: Duration::from_millis(0),
            arima: ArimaOrder { p: 2, d: 1, q: 2 },
            horizon: 8,
            sample_seed: 42,
        }
    }

    /// Fails every fetch with the given error kind, counting calls.
    struct FailingSource {
        calls: AtomicU32,
        fatal: bool,
    }

    impl FailingSource {
        fn transient() -> Self {
            Self { calls: AtomicU32::new(0), fatal: false }
        }

        fn fatal() -> Self {
            Self { calls: AtomicU32::new(0), fatal: true }
        }

        fn error(&self) -> PipelineError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fatal {
                PipelineError::Alignment("columns out of order".to_string())
            } else {
                PipelineError::Fetch("connection refused".to_string())
            }
        }
    }

    impl DataSource for FailingSource {
        fn observed(&self, _id: ObservedId) -> Result<ObservedSeries, PipelineError> {
            Err(self.error())
        }

        fn expectation(&self, _id: ExpectationId) -> Result<ExpectationSeries, PipelineError> {
            Err(self.error())
        }
    }

    /// Delegates to the sample source, counting observed fetches.
    struct CountingSource {
        inner: SampleSource,
        observed_calls: AtomicU32,
    }

    impl DataSource for CountingSource {
        fn observed(&self, id: ObservedId) -> Result<ObservedSeries, PipelineError> {
            self.observed_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.observed(id)
        }

        fn expectation(&self, id: ExpectationId) -> Result<ExpectationSeries, PipelineError> {
            self.inner.expectation(id)
        }
    }

    #[test]
    fn fresh_build_assembles_every_indicator_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let source = SampleSource::new(config.sample_seed);

        let outcome = run_resilient(&source, &config).unwrap();
        assert_eq!(outcome.provenance, Provenance::Fresh);
        assert!(outcome.saved_to.is_some());

        let mut columns = outcome.table.columns.clone();
        columns.sort();
        assert_eq!(
            columns,
            vec![
                "gdp",
                "household_consumption",
                "industrial_gdp",
                "ipca",
                "selic",
                "trade_gdp",
                "unemployment"
            ]
        );

        // Persisted artifact is loadable and identical in shape.
        let store = TableStore::new(dir.path());
        let loaded = store.load("dataset").unwrap();
        assert_eq!(loaded.index, outcome.table.index);
        assert_eq!(loaded.columns, outcome.table.columns);
    }

    #[test]
    fn all_attempts_failing_falls_back_to_persisted_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        // Seed the artifact with a fresh build first.
        let good = SampleSource::new(config.sample_seed);
        let fresh = run_resilient(&good, &config).unwrap();

        let bad = FailingSource::transient();
        let outcome = run_resilient(&bad, &config).unwrap();
        assert_eq!(outcome.provenance, Provenance::Fallback);
        assert!(outcome.saved_to.is_none());
        assert_eq!(outcome.table.index, fresh.table.index);
    }

    #[test]
    fn save_failure_is_retried_like_any_attempt_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        // The artifact's parent directory never exists, so every save fails
        // even though every build succeeds.
        config.table_key = "missing/dataset".to_string();

        let source = CountingSource {
            inner: SampleSource::new(config.sample_seed),
            observed_calls: AtomicU32::new(0),
        };
        let err = run_resilient(&source, &config).unwrap_err();

        // Every attempt ran a full build and then failed on save; the first
        // save error did not escape the retry boundary.
        assert_eq!(source.observed_calls.load(Ordering::SeqCst), 21);
        match err {
            PipelineError::AttemptsExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(last.contains("failed to create"), "last error: {last}");
            }
            other => panic!("expected AttemptsExhausted, got {other}"),
        }
    }

    #[test]
    fn exhausted_attempts_without_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let bad = FailingSource::transient();
        let err = run_resilient(&bad, &config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::AttemptsExhausted { attempts: 3, .. }
        ));
    }

    #[test]
    fn fatal_errors_stop_immediately_without_retry_or_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        // A persisted artifact exists, but fatal errors must not reach it.
        let good = SampleSource::new(config.sample_seed);
        run_resilient(&good, &config).unwrap();

        let bad = FailingSource::fatal();
        let err = run_resilient(&bad, &config).unwrap_err();
        assert!(matches!(err, PipelineError::Alignment(_)));
        // Parallel fan-out may fail several indicators in the one attempt,
        // but there must be no second attempt's worth of calls.
        assert!(bad.calls.load(Ordering::SeqCst) <= 13);
    }

    #[test]
    fn unemployment_trailing_gap_is_carried_forward_in_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let source = SampleSource::new(config.sample_seed);

        let table = run_once(&source, &config).unwrap();
        let unemployment = table.column("unemployment").unwrap();
        let gdp = table.column("gdp").unwrap();

        // GDP's projection runs past the unemployment survey's coverage, so
        // without carry-forward the unemployment tail would be missing.
        let last_gdp = gdp.iter().rposition(|v| v.is_some()).unwrap();
        assert!(unemployment[last_gdp].is_some());
    }
}
