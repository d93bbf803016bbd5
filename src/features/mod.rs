//! The indicator catalog: which series are built, and how.
//!
//! Each indicator pairs an observed series with a fill strategy. Most combine
//! the observed series with a survey expectation at a fixed look-back lag;
//! trade GDP has no survey and is extended with an ARIMA forecast instead.

use crate::assemble::IndicatorColumn;
use crate::data::{DataSource, ExpectationId, ObservedId};
use crate::domain::BuildConfig;
use crate::error::PipelineError;
use crate::forecast;
use crate::project;

/// How an indicator's unpublished periods are filled.
#[derive(Debug, Clone, Copy)]
pub enum IndicatorKind {
    /// Merge with a survey expectation and project at `lag`.
    Projected {
        expectation: ExpectationId,
        /// Look-back distance to the comparison base.
        lag: usize,
        /// Spline-fill interior publication gaps after projecting.
        interpolate: bool,
    },
    /// Extend with an ARIMA forecast of the observed series itself.
    Forecast,
}

/// One column of the assembled dataset.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorSpec {
    pub observed: ObservedId,
    pub kind: IndicatorKind,
    /// Carry the last known value through the trailing gap at assembly.
    pub carry_forward: bool,
}

/// The full dataset, in column order.
///
/// Lags follow the comparison convention of each survey: quarterly growth
/// expectations are year-over-year (lag 4), monthly IPCA is month-over-month
/// (lag 1). Rate indicators take the expectation level directly but keep the
/// same base gate, so a level is only accepted where the series was being
/// published `lag` periods earlier.
pub fn default_indicators() -> Vec<IndicatorSpec> {
    vec![
        IndicatorSpec {
            observed: ObservedId::Gdp,
            kind: IndicatorKind::Projected {
                expectation: ExpectationId::GdpQuarterly,
                lag: 4,
                interpolate: false,
            },
            carry_forward: false,
        },
        IndicatorSpec {
            observed: ObservedId::HouseholdConsumption,
            kind: IndicatorKind::Projected {
                expectation: ExpectationId::HouseholdConsumptionAnnual,
                lag: 4,
                interpolate: true,
            },
            carry_forward: false,
        },
        IndicatorSpec {
            observed: ObservedId::IndustrialGdp,
            kind: IndicatorKind::Projected {
                expectation: ExpectationId::IndustrialGdpAnnual,
                lag: 4,
                interpolate: true,
            },
            carry_forward: false,
        },
        IndicatorSpec {
            observed: ObservedId::UnemploymentRate,
            kind: IndicatorKind::Projected {
                expectation: ExpectationId::UnemploymentQuarterly,
                lag: 4,
                interpolate: false,
            },
            carry_forward: true,
        },
        IndicatorSpec {
            observed: ObservedId::Ipca,
            kind: IndicatorKind::Projected {
                expectation: ExpectationId::IpcaMonthly,
                lag: 1,
                interpolate: false,
            },
            carry_forward: false,
        },
        IndicatorSpec {
            observed: ObservedId::Selic,
            kind: IndicatorKind::Projected {
                expectation: ExpectationId::SelicMeetings,
                lag: 1,
                interpolate: false,
            },
            carry_forward: false,
        },
        IndicatorSpec {
            observed: ObservedId::TradeGdp,
            kind: IndicatorKind::Forecast,
            carry_forward: false,
        },
    ]
}

/// Fetch and build one indicator column.
pub fn build_indicator(
    spec: &IndicatorSpec,
    source: &dyn DataSource,
    config: &BuildConfig,
) -> Result<IndicatorColumn, PipelineError> {
    let observed = source.observed(spec.observed)?.after(config.start);

    let filled = match spec.kind {
        IndicatorKind::Projected {
            expectation,
            lag,
            interpolate,
        } => {
            let expectation = source.expectation(expectation)?;
            let projected = project::project(&observed, &expectation, lag)?;
            if interpolate {
                project::interpolate::interpolate_cubic(&projected)?
            } else {
                projected
            }
        }
        IndicatorKind::Forecast => {
            let path = forecast::forecast(&observed, config.arima, config.horizon)?;
            forecast::extend_with_forecast(&observed, &path)?
        }
    };

    Ok(IndicatorColumn::new(
        spec.observed.column_name(),
        filled.into_points(),
        spec.carry_forward,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleSource;
    use crate::domain::{ArimaOrder, Period};
    use std::path::PathBuf;
    use std::time::Duration;

    fn test_config() -> BuildConfig {
        BuildConfig {
            data_dir: PathBuf::from("data"),
            table_key: "dataset".to_string(),
            start: Period::from_month(2013, 12).unwrap(),
            max_attempts: 1,
            retry_delay: Duration::from_secs(0),
            arima: ArimaOrder { p: 2, d: 1, q: 2 },
            horizon: 8,
            sample_seed: 42,
        }
    }

    #[test]
    fn catalog_has_unique_column_names() {
        let specs = default_indicators();
        let mut names: Vec<_> = specs.iter().map(|s| s.observed.column_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), specs.len());
    }

    #[test]
    fn only_unemployment_is_carried_forward() {
        let carried: Vec<_> = default_indicators()
            .into_iter()
            .filter(|s| s.carry_forward)
            .map(|s| s.observed.column_name())
            .collect();
        assert_eq!(carried, vec!["unemployment"]);
    }

    #[test]
    fn every_indicator_builds_from_the_sample_source() {
        let source = SampleSource::new(42);
        let config = test_config();
        for spec in default_indicators() {
            let column = build_indicator(&spec, &source, &config).unwrap();
            assert_eq!(column.name, spec.observed.column_name());
            assert!(!column.points.is_empty());
        }
    }

    #[test]
    fn start_cutoff_excludes_the_boundary_period() {
        let source = SampleSource::new(42);
        let config = test_config();
        let spec = default_indicators()
            .into_iter()
            .find(|s| s.observed == ObservedId::Gdp)
            .unwrap();

        let raw = source.observed(ObservedId::Gdp).unwrap();
        assert_eq!(raw.points()[0].0, config.start);

        let column = build_indicator(&spec, &source, &config).unwrap();
        assert!(column.points.iter().all(|(p, _)| *p > config.start));
    }

    #[test]
    fn projected_gdp_extends_past_observed_history() {
        let source = SampleSource::new(42);
        let config = test_config();
        let spec = default_indicators()
            .into_iter()
            .find(|s| s.observed == ObservedId::Gdp)
            .unwrap();

        let observed_end = source
            .observed(ObservedId::Gdp)
            .unwrap()
            .last_known_period()
            .unwrap();
        let column = build_indicator(&spec, &source, &config).unwrap();
        let filled_end = column
            .points
            .iter()
            .rev()
            .find(|(_, v)| v.is_some())
            .map(|(p, _)| *p)
            .unwrap();
        assert!(filled_end > observed_end);
    }

    #[test]
    fn interior_gaps_are_interpolated_for_consumption() {
        let source = SampleSource::new(42);
        let config = test_config();
        let spec = default_indicators()
            .into_iter()
            .find(|s| s.observed == ObservedId::HouseholdConsumption)
            .unwrap();

        let observed = source.observed(ObservedId::HouseholdConsumption).unwrap();
        let gap_periods: Vec<_> = observed
            .points()
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(p, _)| *p)
            .collect();
        assert!(!gap_periods.is_empty());

        let column = build_indicator(&spec, &source, &config).unwrap();
        for gap in gap_periods {
            let filled = column.points.iter().find(|(p, _)| *p == gap).unwrap().1;
            assert!(filled.is_some(), "gap at {gap} not interpolated");
        }
    }
}
