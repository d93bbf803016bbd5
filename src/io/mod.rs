//! Input/output helpers.
//!
//! - persisted table artifacts (`store`)
//! - CSV export (`export`)

pub mod export;
pub mod store;

pub use export::*;
pub use store::*;
