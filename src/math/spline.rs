//! Natural cubic spline through a set of knots.
//!
//! The interpolator needs a smooth curve through **all** known points of a
//! series (not a local polynomial), so we fit a classic natural cubic spline:
//! second derivatives at the interior knots solve a tridiagonal system, and
//! the boundary second derivatives are zero.
//!
//! Numerical notes:
//! - The tridiagonal system is tiny (one unknown per interior knot) and
//!   diagonally dominant; we solve it with an LU factorization.
//! - Evaluation outside the knot span is refused (`None`) — extrapolating a
//!   cubic is exactly the failure mode the caller must avoid.

use nalgebra::{DMatrix, DVector};

use crate::error::PipelineError;

/// Minimum knot count for a cubic spline to be well defined here.
pub const MIN_KNOTS: usize = 4;

#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot (zero at the boundaries).
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit a natural cubic spline through `(xs[i], ys[i])`.
    ///
    /// `xs` must be strictly increasing with at least [`MIN_KNOTS`] entries.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self, PipelineError> {
        if xs.len() != ys.len() {
            return Err(PipelineError::Numerical(format!(
                "spline: {} x-values vs {} y-values",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < MIN_KNOTS {
            return Err(PipelineError::InsufficientData(format!(
                "spline requires at least {MIN_KNOTS} known points, got {}",
                xs.len()
            )));
        }
        for pair in xs.windows(2) {
            if !(pair[1] > pair[0]) {
                return Err(PipelineError::Numerical(
                    "spline knots must be strictly increasing".to_string(),
                ));
            }
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::Numerical("non-finite spline knot".to_string()));
        }

        let n = xs.len();
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

        // Tridiagonal system for the n-2 interior second derivatives.
        let k = n - 2;
        let mut a = DMatrix::<f64>::zeros(k, k);
        let mut rhs = DVector::<f64>::zeros(k);
        for i in 0..k {
            a[(i, i)] = 2.0 * (h[i] + h[i + 1]);
            if i > 0 {
                a[(i, i - 1)] = h[i];
            }
            if i + 1 < k {
                a[(i, i + 1)] = h[i + 1];
            }
            rhs[i] = 6.0
                * ((ys[i + 2] - ys[i + 1]) / h[i + 1] - (ys[i + 1] - ys[i]) / h[i]);
        }

        let interior = a
            .lu()
            .solve(&rhs)
            .ok_or_else(|| PipelineError::Numerical("spline system is singular".to_string()))?;

        let mut m = vec![0.0; n];
        for i in 0..k {
            m[i + 1] = interior[i];
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    /// Evaluate the spline at `x`. Returns `None` outside the knot span.
    pub fn eval(&self, x: f64) -> Option<f64> {
        let first = *self.xs.first()?;
        let last = *self.xs.last()?;
        if x < first || x > last {
            return None;
        }

        // Index of the interval [xs[i], xs[i+1]] containing x.
        let i = match self.xs.binary_search_by(|probe| probe.partial_cmp(&x).unwrap()) {
            Ok(i) => i.min(self.xs.len() - 2),
            Err(i) => i - 1,
        };

        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;

        let value = a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a.powi(3) - a) * self.m[i] + (b.powi(3) - b) * self.m[i + 1]) * (h * h) / 6.0;
        Some(value)
    }
}
