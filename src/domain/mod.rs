//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the normalized time axis (`Period`, `Cadence`)
//! - series types (`ObservedSeries`, `ExpectationSeries`, `ProjectedSeries`,
//!   `ForecastedSeries`)
//! - the final artifact (`AssembledTable`)
//! - run configuration (`BuildConfig`, `ArimaOrder`)

pub mod config;
pub mod period;
pub mod series;
pub mod table;

pub use config::*;
pub use period::*;
pub use series::*;
pub use table::*;
