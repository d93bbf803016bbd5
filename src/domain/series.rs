//! Series types: observed, expectation, projected, forecasted.
//!
//! All four are ordered mappings `Period → value`. Constructors validate the
//! join-key invariant up front — strictly increasing periods, no duplicates —
//! so downstream joins can assume well-formed axes and fail fast with
//! `Alignment` instead of silently misaligning columns.

use serde::{Deserialize, Serialize};

use crate::domain::period::{Cadence, Period};
use crate::error::PipelineError;

fn check_strictly_increasing(name: &str, periods: impl Iterator<Item = Period>) -> Result<(), PipelineError> {
    let mut prev: Option<Period> = None;
    for period in periods {
        if let Some(p) = prev {
            if period <= p {
                return Err(PipelineError::Alignment(format!(
                    "series '{name}': period {period} does not follow {p} (duplicate or out of order)"
                )));
            }
        }
        prev = Some(period);
    }
    Ok(())
}

/// Ground-truth data already published. `None` marks periods not yet released.
///
/// Immutable once fetched; the projector reads it, never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedSeries {
    name: String,
    cadence: Cadence,
    points: Vec<(Period, Option<f64>)>,
}

impl ObservedSeries {
    pub fn new(
        name: impl Into<String>,
        cadence: Cadence,
        points: Vec<(Period, Option<f64>)>,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        check_strictly_increasing(&name, points.iter().map(|(p, _)| *p))?;
        Ok(Self { name, cadence, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn points(&self) -> &[(Period, Option<f64>)] {
        &self.points
    }

    /// Last period with a non-missing value.
    pub fn last_known_period(&self) -> Option<Period> {
        self.points
            .iter()
            .rev()
            .find(|(_, v)| v.is_some())
            .map(|(p, _)| *p)
    }

    /// Non-missing values in period order.
    pub fn known_values(&self) -> Vec<f64> {
        self.points.iter().filter_map(|(_, v)| *v).collect()
    }

    /// Drop periods at or before `start`.
    pub fn after(&self, start: Period) -> Self {
        Self {
            name: self.name.clone(),
            cadence: self.cadence,
            points: self.points.iter().copied().filter(|(p, _)| *p > start).collect(),
        }
    }
}

/// Unit of a survey expectation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectationUnit {
    /// Percentage change over the comparison period `lag` steps back.
    Percent,
    /// A direct level forecast (e.g. a rate in % p.a. or p.p.).
    Level,
}

/// Survey-based median expectations. Values are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationSeries {
    name: String,
    cadence: Cadence,
    unit: ExpectationUnit,
    points: Vec<(Period, f64)>,
}

impl ExpectationSeries {
    pub fn new(
        name: impl Into<String>,
        cadence: Cadence,
        unit: ExpectationUnit,
        points: Vec<(Period, f64)>,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        check_strictly_increasing(&name, points.iter().map(|(p, _)| *p))?;
        Ok(Self { name, cadence, unit, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn unit(&self) -> ExpectationUnit {
        self.unit
    }

    pub fn points(&self) -> &[(Period, f64)] {
        &self.points
    }
}

/// A merged-and-filled series produced by the projector (or by extending an
/// observed series with a forecast). Read-only downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedSeries {
    name: String,
    points: Vec<(Period, Option<f64>)>,
}

impl ProjectedSeries {
    pub fn new(
        name: impl Into<String>,
        points: Vec<(Period, Option<f64>)>,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        check_strictly_increasing(&name, points.iter().map(|(p, _)| *p))?;
        Ok(Self { name, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[(Period, Option<f64>)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(Period, Option<f64>)> {
        self.points
    }
}

/// Model-generated future values, starting immediately after the last
/// observed period. Every forecast value is present by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastedSeries {
    name: String,
    points: Vec<(Period, f64)>,
}

impl ForecastedSeries {
    pub fn new(
        name: impl Into<String>,
        points: Vec<(Period, f64)>,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        check_strictly_increasing(&name, points.iter().map(|(p, _)| *p))?;
        Ok(Self { name, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[(Period, f64)] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(year: i32, quarter: u32) -> Period {
        Period::from_quarter(year, quarter).unwrap()
    }

    #[test]
    fn observed_rejects_duplicate_periods() {
        let points = vec![(q(2024, 1), Some(100.0)), (q(2024, 1), Some(101.0))];
        let err = ObservedSeries::new("gdp", Cadence::Quarterly, points).unwrap_err();
        assert!(matches!(err, PipelineError::Alignment(_)));
    }

    #[test]
    fn observed_rejects_out_of_order_periods() {
        let points = vec![(q(2024, 2), Some(100.0)), (q(2024, 1), Some(101.0))];
        assert!(ObservedSeries::new("gdp", Cadence::Quarterly, points).is_err());
    }

    #[test]
    fn after_drops_the_boundary_period() {
        let points = vec![
            (q(2023, 4), Some(99.0)),
            (q(2024, 1), Some(100.0)),
            (q(2024, 2), None),
        ];
        let s = ObservedSeries::new("gdp", Cadence::Quarterly, points).unwrap();
        let t = s.after(q(2023, 4));
        assert_eq!(t.points().len(), 2);
        assert_eq!(t.points()[0].0, q(2024, 1));
    }

    #[test]
    fn last_known_period_skips_missing_tail() {
        let points = vec![
            (q(2024, 1), Some(100.0)),
            (q(2024, 2), Some(101.0)),
            (q(2024, 3), None),
        ];
        let s = ObservedSeries::new("gdp", Cadence::Quarterly, points).unwrap();
        assert_eq!(s.last_known_period(), Some(q(2024, 2)));
    }

    #[test]
    fn expectation_series_validates_axis() {
        let points = vec![(q(2024, 1), 2.0), (q(2024, 1), 2.1)];
        assert!(
            ExpectationSeries::new("gdp_exp", Cadence::Quarterly, ExpectationUnit::Percent, points)
                .is_err()
        );
    }
}
