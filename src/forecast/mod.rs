//! ARIMA forecasting for the one indicator with no expectation survey.
//!
//! Trade GDP has no published median expectation, so its unpublished periods
//! are forecast from the observed series itself with an ARIMA(p, d, q) model:
//!
//! 1. difference the series `d` times
//! 2. estimate coefficients by Hannan–Rissanen: fit a long AR model first to
//!    obtain residual proxies, then regress on `p` value lags and `q`
//!    residual lags (both stages are ordinary least squares through
//!    `math::lstsq`)
//! 3. forecast recursively with future shocks at zero
//! 4. integrate the forecast back `d` times
//!
//! Forecast periods start immediately after the last observed period and
//! continue at the observed cadence.

use nalgebra::{DMatrix, DVector};

use crate::domain::{ArimaOrder, ForecastedSeries, ObservedSeries, ProjectedSeries};
use crate::error::PipelineError;
use crate::math::solve_least_squares;

/// Fitted ARIMA coefficients.
#[derive(Debug, Clone)]
struct FittedArima {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// Last `q` in-sample residuals, most recent last.
    residual_tail: Vec<f64>,
}

/// Forecast `horizon` periods past the end of `observed`.
pub fn forecast(
    observed: &ObservedSeries,
    order: ArimaOrder,
    horizon: usize,
) -> Result<ForecastedSeries, PipelineError> {
    if horizon == 0 {
        return Err(PipelineError::Config("forecast horizon must be at least 1".to_string()));
    }

    let values = observed.known_values();
    let min_len = required_observations(order);
    if values.len() < min_len {
        return Err(PipelineError::InsufficientData(format!(
            "series '{}' has {} observations; ARIMA({},{},{}) needs at least {min_len}",
            observed.name(),
            values.len(),
            order.p,
            order.d,
            order.q
        )));
    }

    // Difference d times, remembering the tail value of every level so the
    // forecast can be integrated back.
    let mut diffed = values.clone();
    let mut tails = Vec::with_capacity(order.d);
    for _ in 0..order.d {
        tails.push(*diffed.last().expect("length checked above"));
        diffed = diffed.windows(2).map(|w| w[1] - w[0]).collect();
    }

    let fitted = fit_hannan_rissanen(&diffed, order)?;
    let mut path = forecast_recursive(&diffed, &fitted, order, horizon);

    // Integrate: undo each differencing pass via cumulative sums anchored at
    // the recorded tails.
    for tail in tails.into_iter().rev() {
        let mut level = tail;
        for value in path.iter_mut() {
            level += *value;
            *value = level;
        }
    }

    let last = observed.last_known_period().ok_or_else(|| {
        PipelineError::InsufficientData(format!("series '{}' has no known periods", observed.name()))
    })?;
    let mut period = last;
    let points = path
        .into_iter()
        .map(|value| {
            period = period.succ(observed.cadence());
            (period, value)
        })
        .collect();

    ForecastedSeries::new(observed.name(), points)
}

/// Concatenate an observed series with its forecast into one column.
///
/// Trailing unreleased periods of the observed series are dropped first; the
/// forecast covers them.
pub fn extend_with_forecast(
    observed: &ObservedSeries,
    forecast: &ForecastedSeries,
) -> Result<ProjectedSeries, PipelineError> {
    let Some(last) = observed.last_known_period() else {
        return Err(PipelineError::InsufficientData(format!(
            "series '{}' has no known periods to extend",
            observed.name()
        )));
    };

    let mut points: Vec<_> = observed
        .points()
        .iter()
        .copied()
        .filter(|(p, _)| *p <= last)
        .collect();
    points.extend(forecast.points().iter().map(|(p, v)| (*p, Some(*v))));

    ProjectedSeries::new(observed.name(), points)
}

/// Observation count below which estimation is refused.
fn required_observations(order: ArimaOrder) -> usize {
    let m = long_ar_order(order);
    // After d differencing passes we still need stage-2 rows: m + q burn-in
    // plus one row per estimated parameter plus a little slack.
    order.d + m + order.q + (order.p + order.q + 1) + 2
}

/// Stage-1 long AR order for residual proxies.
fn long_ar_order(order: ArimaOrder) -> usize {
    (order.p + order.q + 2).max(1)
}

fn fit_hannan_rissanen(values: &[f64], order: ArimaOrder) -> Result<FittedArima, PipelineError> {
    let n = values.len();
    let m = long_ar_order(order);

    // Stage 1: long AR fit, residual proxies for t >= m.
    let residuals = if order.q > 0 {
        let rows = n - m;
        let x = DMatrix::from_fn(rows, m + 1, |r, c| {
            if c == 0 { 1.0 } else { values[m + r - c] }
        });
        let y = DVector::from_fn(rows, |r, _| values[m + r]);
        let beta = solve_least_squares(&x, &y).ok_or_else(|| {
            PipelineError::Numerical("ARIMA stage-1 regression is singular".to_string())
        })?;

        let mut residuals = vec![0.0; n];
        for r in 0..rows {
            let fitted: f64 =
                beta[0] + (1..=m).map(|c| beta[c] * values[m + r - c]).sum::<f64>();
            residuals[m + r] = values[m + r] - fitted;
        }
        residuals
    } else {
        vec![0.0; n]
    };

    // Stage 2: regress on p value lags and q residual lags.
    let start = m + order.q;
    let rows = n - start;
    let k = 1 + order.p + order.q;
    let x = DMatrix::from_fn(rows, k, |r, c| {
        let t = start + r;
        if c == 0 {
            1.0
        } else if c <= order.p {
            values[t - c]
        } else {
            residuals[t - (c - order.p)]
        }
    });
    let y = DVector::from_fn(rows, |r, _| values[start + r]);
    let beta = solve_least_squares(&x, &y).ok_or_else(|| {
        PipelineError::Numerical("ARIMA stage-2 regression is singular".to_string())
    })?;

    let intercept = beta[0];
    let ar: Vec<f64> = (1..=order.p).map(|c| beta[c]).collect();
    let ma: Vec<f64> = (1..=order.q).map(|c| beta[order.p + c]).collect();

    // Most recent q residuals feed the first forecast steps.
    let residual_tail = residuals[n - order.q.min(n)..].to_vec();

    Ok(FittedArima {
        intercept,
        ar,
        ma,
        residual_tail,
    })
}

fn forecast_recursive(
    values: &[f64],
    fitted: &FittedArima,
    order: ArimaOrder,
    horizon: usize,
) -> Vec<f64> {
    let mut history: Vec<f64> = values.to_vec();
    let mut shocks: Vec<f64> = fitted.residual_tail.clone();
    let mut out = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        let mut value = fitted.intercept;
        for (lag, coeff) in fitted.ar.iter().enumerate() {
            value += coeff * history[history.len() - 1 - lag];
        }
        for (lag, coeff) in fitted.ma.iter().enumerate() {
            if shocks.len() > lag {
                value += coeff * shocks[shocks.len() - 1 - lag];
            }
        }
        history.push(value);
        // Future shocks are zero in expectation.
        shocks.push(0.0);
        out.push(value);
    }

    out
}
