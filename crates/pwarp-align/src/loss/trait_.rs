//! Pointwise loss trait used when scoring warps.
//!
//! This module defines the strategy that compares one predicted template
//! sample with one observed data sample.

use ndarray::ArrayView1;

/// Pointwise loss between a prediction and an observation.
///
/// Both views hold one timepoint's features. The evaluator sums the
/// returned values over timepoints and normalizes by `features * T`, so an
/// implementation should sum (not average) over features.
///
/// The loss is called once per trial and timepoint, potentially millions of
/// times per search; implementations must not allocate or touch shared
/// mutable state.
pub trait PointwiseLoss: Sync {
    /// Loss of `prediction` against `observation`. Lower is better.
    fn loss(&self, prediction: ArrayView1<'_, f64>, observation: ArrayView1<'_, f64>) -> f64;

    /// Get the name of this loss.
    fn name(&self) -> &'static str;
}

/// Adapter turning a closure into a [`PointwiseLoss`].
///
/// ```
/// use pwarp_align::loss::{loss_fn, PointwiseLoss};
/// use ndarray::array;
///
/// let huber = loss_fn(|p, o| {
///     p.iter().zip(o.iter()).map(|(a, b)| {
///         let r = (a - b).abs();
///         if r < 1.0 { 0.5 * r * r } else { r - 0.5 }
///     }).sum()
/// });
/// assert_eq!(huber.loss(array![0.0].view(), array![3.0].view()), 2.5);
/// ```
#[derive(Clone, Copy)]
pub struct FnLoss<F> {
    func: F,
}

/// Wrap a closure `(prediction, observation) -> loss` as a [`PointwiseLoss`].
pub fn loss_fn<F>(func: F) -> FnLoss<F>
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64 + Sync,
{
    FnLoss { func }
}

impl<F> PointwiseLoss for FnLoss<F>
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64 + Sync,
{
    #[inline]
    fn loss(&self, prediction: ArrayView1<'_, f64>, observation: ArrayView1<'_, f64>) -> f64 {
        (self.func)(prediction, observation)
    }

    fn name(&self) -> &'static str {
        "custom"
    }
}
