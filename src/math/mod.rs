//! Mathematical utilities: least squares and cubic spline interpolation.

pub mod lstsq;
pub mod spline;

pub use lstsq::*;
pub use spline::*;
