//! Piecewise-linear time warps.
//!
//! Per-trial warps are described by knot sets ([`knots`]) and evaluated by
//! two stateless batch primitives: [`SparseEvaluator`] for arbitrary
//! `(trial, x)` queries and [`DenseResampler`] for resampling whole signals
//! through their trial's warp.

pub mod error;
pub mod knots;
pub mod interpolation;
pub mod filter;
pub mod validation;
pub mod parallel;

pub use error::{Result, WarpError};
pub use knots::{KnotsView, SegmentCursor, TrialKnots, WarpKnots};
pub use interpolation::SparseEvaluator;
pub use filter::DenseResampler;
pub use validation::ValidationConfig;
pub use parallel::Parallelism;
