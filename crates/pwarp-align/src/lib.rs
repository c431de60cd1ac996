//! Warp scoring for template alignment.
//!
//! A warp search repeatedly proposes knot sets and scores them with
//! [`WarpLossEvaluator`]. Scoring abandons a trial as soon as its loss can no
//! longer beat the bound kept in [`LossBound`].

pub mod loss;
pub mod warp_loss;
pub mod bound;

pub use pwarp_core::{Result, WarpError};
pub use loss::{loss_fn, AbsoluteError, FnLoss, PointwiseLoss, SquaredError};
pub use warp_loss::{LossReport, TrialOutcome, WarpLossEvaluator, WarpLossInputs};
pub use bound::LossBound;
