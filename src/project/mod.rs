//! Series projection: merge an observed series with an expectation series and
//! fill unpublished periods from a lagged growth model.
//!
//! Given:
//! - an observed series with missing entries for periods not yet released
//! - a median expectation series (percent change over the period `lag` steps
//!   back, or a direct level forecast)
//!
//! we outer-join the two on `Period`, broadcast annual expectations to the
//! quarters they cover, and walk the merged axis once in ascending order. At
//! index `idx ≥ lag` where the observed value is missing and both the
//! expectation at `idx` and the observed base at `idx - lag` are present:
//!
//! ```text
//! projected[idx] = base * (1 + expectation / 100)   (percent unit)
//! projected[idx] = expectation                       (level unit)
//! ```
//!
//! Bases are read from an immutable snapshot of the observed column, never
//! from the output being built: a value projected at `idx - lag` is not a
//! valid base for `idx`. Everything that cannot be filled under that rule
//! stays missing.

pub mod interpolate;

use std::collections::BTreeMap;

use crate::domain::{Cadence, ExpectationSeries, ExpectationUnit, ObservedSeries, Period, ProjectedSeries};
use crate::error::PipelineError;

/// One row of the merged observed/expectation axis.
#[derive(Debug, Clone, Copy)]
pub struct MergedRow {
    pub period: Period,
    pub observed: Option<f64>,
    pub expectation: Option<f64>,
}

/// Outer-join `observed` and `expectation` on `Period`, in ascending period
/// order.
///
/// Annual expectations against a quarterly observed series are broadcast
/// first: every quarter of the expectation's reference year receives the
/// annual value. Any other cadence mismatch is an alignment error.
pub fn merge(
    observed: &ObservedSeries,
    expectation: &ExpectationSeries,
) -> Result<Vec<MergedRow>, PipelineError> {
    let expectation_points: Vec<(Period, f64)> =
        match (observed.cadence(), expectation.cadence()) {
            (c_obs, c_exp) if c_obs == c_exp => expectation.points().to_vec(),
            (Cadence::Quarterly, Cadence::Annual) => expectation
                .points()
                .iter()
                .flat_map(|(p, v)| p.quarters_of_year().map(|q| (q, *v)))
                .collect(),
            (c_obs, c_exp) => {
                return Err(PipelineError::Alignment(format!(
                    "cannot merge {c_obs:?} observed series '{}' with {c_exp:?} expectation series '{}'",
                    observed.name(),
                    expectation.name()
                )));
            }
        };

    let mut rows: BTreeMap<Period, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for (period, value) in observed.points() {
        rows.insert(*period, (*value, None));
    }
    for (period, value) in expectation_points {
        rows.entry(period).or_insert((None, None)).1 = Some(value);
    }

    Ok(rows
        .into_iter()
        .map(|(period, (observed, expectation))| MergedRow {
            period,
            observed,
            expectation,
        })
        .collect())
}

/// Project unpublished periods of `observed` using `expectation` at `lag`.
///
/// The returned series covers the full merged period range; entries that
/// cannot be filled remain missing.
pub fn project(
    observed: &ObservedSeries,
    expectation: &ExpectationSeries,
    lag: usize,
) -> Result<ProjectedSeries, PipelineError> {
    if lag == 0 {
        return Err(PipelineError::Config(format!(
            "projection lag for '{}' must be at least 1",
            observed.name()
        )));
    }

    let rows = merge(observed, expectation)?;

    // Immutable snapshot of the observed column: the only valid base source.
    let bases: Vec<Option<f64>> = rows.iter().map(|r| r.observed).collect();

    let mut out: Vec<(Period, Option<f64>)> = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let value = match row.observed {
            Some(v) => Some(v),
            None if idx >= lag => match (bases[idx - lag], row.expectation) {
                (Some(base), Some(e)) => match expectation.unit() {
                    ExpectationUnit::Percent => Some(base * (1.0 + e / 100.0)),
                    ExpectationUnit::Level => Some(e),
                },
                _ => None,
            },
            None => None,
        };
        out.push((row.period, value));
    }

    ProjectedSeries::new(observed.name(), out)
}
