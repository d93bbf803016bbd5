//! Deterministic synthetic data source for offline runs and tests.
//!
//! Generates observed and expectation series with the same shapes the live
//! APIs produce: quarterly index levels with a publication lag, monthly IPCA,
//! rate levels for unemployment/Selic, and expectation coverage extending a
//! few periods past the observed end. Seeded per series so runs are
//! reproducible and series are independent.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::{DataSource, ExpectationId, ObservedId};
use crate::domain::{Cadence, ExpectationSeries, ObservedSeries, Period};
use crate::error::PipelineError;

/// First generated period (the default start cutoff; builds keep what follows).
fn sample_start() -> Period {
    Period::from_month(2013, 12).expect("static period")
}

/// Quarters of observed history generated for quarterly series.
const OBSERVED_QUARTERS: usize = 46; // 2013-Q4 .. 2025-Q1
/// Months of observed history generated for the monthly IPCA series.
const OBSERVED_MONTHS: usize = 137; // 2013-12 .. 2025-04

pub struct SampleSource {
    seed: u64,
}

impl SampleSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Per-series RNG so adding a series never reshuffles the others.
    fn rng(&self, tag: &str) -> StdRng {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        tag.hash(&mut hasher);
        StdRng::seed_from_u64(hasher.finish())
    }
}

impl DataSource for SampleSource {
    fn observed(&self, id: ObservedId) -> Result<ObservedSeries, PipelineError> {
        let mut rng = self.rng(id.column_name());
        let noise = Normal::new(0.0, 1.0)
            .map_err(|e| PipelineError::Fetch(format!("noise distribution error: {e}")))?;

        match id {
            ObservedId::Gdp | ObservedId::TradeGdp => {
                index_series(id, 100.0, 0.005, 0.3, &[], &mut rng, noise)
            }
            // An interior publication gap, so interpolation has real work.
            ObservedId::HouseholdConsumption | ObservedId::IndustrialGdp => {
                index_series(id, 100.0, 0.004, 0.4, &[26, 27], &mut rng, noise)
            }
            ObservedId::UnemploymentRate => rate_series(id, 9.0, 0.15, &mut rng, noise),
            ObservedId::Selic => rate_series(id, 10.0, 0.35, &mut rng, noise),
            ObservedId::Ipca => {
                let mut points = Vec::with_capacity(OBSERVED_MONTHS);
                let mut period = sample_start();
                let mut level = 4000.0;
                for _ in 0..OBSERVED_MONTHS {
                    points.push((period, Some(level)));
                    level *= 1.0 + (0.004 + 0.001 * noise.sample(&mut rng));
                    period = period.succ(Cadence::Monthly);
                }
                ObservedSeries::new(id.column_name(), Cadence::Monthly, points)
            }
        }
    }

    fn expectation(&self, id: ExpectationId) -> Result<ExpectationSeries, PipelineError> {
        let mut rng = self.rng(id.series_name());
        let noise = Normal::new(0.0, 1.0)
            .map_err(|e| PipelineError::Fetch(format!("noise distribution error: {e}")))?;

        let after_quarters = sample_start_plus_quarters(OBSERVED_QUARTERS);
        let points = match id {
            ExpectationId::GdpQuarterly => {
                percent_path(after_quarters, Cadence::Quarterly, 4, 2.0, 0.4, &mut rng, noise)
            }
            ExpectationId::HouseholdConsumptionAnnual | ExpectationId::IndustrialGdpAnnual => {
                let mut points = Vec::new();
                for year in [2025, 2026] {
                    points.push((
                        Period::from_year(year)?,
                        2.0 + 0.5 * noise.sample(&mut rng),
                    ));
                }
                points
            }
            ExpectationId::UnemploymentQuarterly => {
                percent_path(after_quarters, Cadence::Quarterly, 3, 8.0, 0.2, &mut rng, noise)
            }
            ExpectationId::SelicMeetings => {
                percent_path(after_quarters, Cadence::Quarterly, 4, 10.0, 0.25, &mut rng, noise)
            }
            ExpectationId::IpcaMonthly => {
                let mut period = sample_start();
                for _ in 0..OBSERVED_MONTHS {
                    period = period.succ(Cadence::Monthly);
                }
                let mut points = Vec::new();
                let mut p = period;
                for _ in 0..9 {
                    points.push((p, 0.35 + 0.1 * noise.sample(&mut rng)));
                    p = p.succ(Cadence::Monthly);
                }
                points
            }
        };

        ExpectationSeries::new(id.series_name(), id.cadence(), id.unit(), points)
    }
}

fn sample_start_plus_quarters(n: usize) -> Period {
    let mut p = sample_start();
    for _ in 0..n {
        p = p.succ(Cadence::Quarterly);
    }
    p
}

/// Quarterly index level series with optional interior gaps.
fn index_series(
    id: ObservedId,
    base: f64,
    drift: f64,
    sigma_pct: f64,
    gaps: &[usize],
    rng: &mut StdRng,
    noise: Normal<f64>,
) -> Result<ObservedSeries, PipelineError> {
    let mut points = Vec::with_capacity(OBSERVED_QUARTERS);
    let mut period = sample_start();
    let mut level = base;
    for i in 0..OBSERVED_QUARTERS {
        let value = if gaps.contains(&i) { None } else { Some(level) };
        points.push((period, value));
        level *= 1.0 + drift + sigma_pct / 100.0 * noise.sample(rng);
        period = period.succ(Cadence::Quarterly);
    }
    ObservedSeries::new(id.column_name(), Cadence::Quarterly, points)
}

/// Quarterly mean-reverting rate series.
fn rate_series(
    id: ObservedId,
    mean: f64,
    sigma: f64,
    rng: &mut StdRng,
    noise: Normal<f64>,
) -> Result<ObservedSeries, PipelineError> {
    let mut points = Vec::with_capacity(OBSERVED_QUARTERS);
    let mut period = sample_start();
    let mut level = mean;
    for _ in 0..OBSERVED_QUARTERS {
        points.push((period, Some(level)));
        level = mean + 0.7 * (level - mean) + sigma * noise.sample(rng);
        period = period.succ(Cadence::Quarterly);
    }
    ObservedSeries::new(id.column_name(), Cadence::Quarterly, points)
}

/// A short expectation path starting at `start`.
fn percent_path(
    start: Period,
    cadence: Cadence,
    len: usize,
    mean: f64,
    sigma: f64,
    rng: &mut StdRng,
    noise: Normal<f64>,
) -> Vec<(Period, f64)> {
    let mut points = Vec::with_capacity(len);
    let mut period = start;
    for _ in 0..len {
        points.push((period, mean + sigma * noise.sample(rng)));
        period = period.succ(cadence);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = SampleSource::new(42).observed(ObservedId::Gdp).unwrap();
        let b = SampleSource::new(42).observed(ObservedId::Gdp).unwrap();
        assert_eq!(a.points(), b.points());

        let c = SampleSource::new(7).observed(ObservedId::Gdp).unwrap();
        assert_ne!(a.points(), c.points());
    }

    #[test]
    fn expectations_start_after_observed_history() {
        let source = SampleSource::new(42);
        let observed = source.observed(ObservedId::Gdp).unwrap();
        let expectation = source.expectation(ExpectationId::GdpQuarterly).unwrap();

        let last_observed = observed.points().last().unwrap().0;
        let first_expected = expectation.points()[0].0;
        assert!(first_expected > last_observed);
    }

    #[test]
    fn consumption_series_has_interior_gaps() {
        let source = SampleSource::new(42);
        let observed = source.observed(ObservedId::HouseholdConsumption).unwrap();
        let missing: Vec<_> = observed
            .points()
            .iter()
            .enumerate()
            .filter(|(_, (_, v))| v.is_none())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(missing, vec![26, 27]);
    }

    #[test]
    fn ipca_is_monthly() {
        let source = SampleSource::new(42);
        let observed = source.observed(ObservedId::Ipca).unwrap();
        assert_eq!(observed.cadence(), Cadence::Monthly);
        assert_eq!(observed.points().len(), OBSERVED_MONTHS);
    }
}
