//! `macrofocus` library crate.
//!
//! The binary (`mf`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., scheduled jobs, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod assemble;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod forecast;
pub mod io;
pub mod math;
pub mod project;
pub mod report;
