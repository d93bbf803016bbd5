//! Cubic interpolation of within-span gaps in a projected series.
//!
//! Projection against an annual expectation can only fill the quarters the
//! survey actually references, leaving intermediate quarters missing. This
//! pass fits a natural cubic spline through **all** known points of the
//! series and fills gaps strictly between the first and last known point.
//! Leading and trailing missing periods are left alone — no extrapolation.

use crate::domain::{Period, ProjectedSeries};
use crate::error::PipelineError;
use crate::math::spline::CubicSpline;

/// Months since year zero; quarterly neighbors sit 3 apart, monthly 1 apart.
fn month_ordinal(period: Period) -> f64 {
    (period.year() as i64 * 12 + period.month() as i64 - 1) as f64
}

/// Fill interior gaps of `series` with natural cubic interpolation.
///
/// Requires at least four known points; fewer is `InsufficientData`.
pub fn interpolate_cubic(series: &ProjectedSeries) -> Result<ProjectedSeries, PipelineError> {
    // Calendar months are the abscissa, so knot spacing stays correct even
    // when a source omits a period outright instead of publishing it missing.
    let known: Vec<(usize, f64, f64)> = series
        .points()
        .iter()
        .enumerate()
        .filter_map(|(i, (p, v))| v.map(|v| (i, month_ordinal(*p), v)))
        .collect();

    if known.len() < crate::math::spline::MIN_KNOTS {
        return Err(PipelineError::InsufficientData(format!(
            "series '{}' has {} known points; cubic interpolation needs {}",
            series.name(),
            known.len(),
            crate::math::spline::MIN_KNOTS
        )));
    }

    // Shift the abscissa to start at zero; the spline only needs distances.
    let x0 = known[0].1;
    let xs: Vec<f64> = known.iter().map(|(_, x, _)| x - x0).collect();
    let ys: Vec<f64> = known.iter().map(|(_, _, v)| *v).collect();
    let spline = CubicSpline::fit(&xs, &ys)?;

    let first_known = known[0].0;
    let last_known = known[known.len() - 1].0;

    let out = series
        .points()
        .iter()
        .enumerate()
        .map(|(i, (period, value))| {
            let filled = match value {
                Some(v) => Some(*v),
                None if i > first_known && i < last_known => {
                    spline.eval(month_ordinal(*period) - x0)
                }
                None => None,
            };
            (*period, filled)
        })
        .collect();

    ProjectedSeries::new(series.name(), out)
}
