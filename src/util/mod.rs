//! Utility types shared across the crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and the rigid [`Transform`]

mod error;
mod math;

pub use error::*;
pub use math::*;
