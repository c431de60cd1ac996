//! Interpolation on uniform grids and sparse warp queries.
//!
//! This module provides linear sampling of signals stored on a uniform grid
//! over `[0, 1]`, and the [`SparseEvaluator`] for batched warp lookups.

pub mod linear;
pub mod sparse;

pub use linear::{sample_rows_into, sample_unit};
pub use sparse::SparseEvaluator;
