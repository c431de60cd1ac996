//! Knot sets and piecewise-linear warp functions.
//!
//! A warp is defined per trial by its knots `(x[n], y[n])`, joined by
//! straight lines. [`WarpKnots`] owns a batch of them, [`KnotsView`] borrows
//! one, and [`TrialKnots`] is a single trial's warp function.

pub mod set;
pub mod segment;

pub use set::{KnotsView, TrialKnots, WarpKnots};
pub use segment::SegmentCursor;
