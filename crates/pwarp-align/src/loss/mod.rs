//! Pointwise losses for scoring warped templates against data.

pub mod trait_;
pub mod squared;
pub mod absolute;

pub use trait_::{loss_fn, FnLoss, PointwiseLoss};
pub use squared::SquaredError;
pub use absolute::AbsoluteError;
