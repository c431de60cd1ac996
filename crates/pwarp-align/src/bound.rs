//! Best-loss bookkeeping for a warp search.
//!
//! Early abandonment is only sound when each trial's bound is the best loss
//! found so far and never increases. [`LossBound`] owns that vector and
//! lowers an entry only for trials whose candidate certified an improvement.

use ndarray::{Array1, ArrayView1};

use pwarp_core::{Result, WarpError};

use crate::warp_loss::LossReport;

/// Monotonically non-increasing per-trial loss bound.
#[derive(Debug, Clone, PartialEq)]
pub struct LossBound {
    best: Array1<f64>,
    updates: usize,
}

impl LossBound {
    /// Bound of `+inf` for every trial, so the first candidate is scored in
    /// full.
    pub fn new(n_trials: usize) -> Self {
        Self {
            best: Array1::from_elem(n_trials, f64::INFINITY),
            updates: 0,
        }
    }

    /// Start from known losses, e.g. those of an initial warp.
    pub fn from_losses(losses: Array1<f64>) -> Result<Self> {
        if let Some(trial) = losses.iter().position(|l| l.is_nan()) {
            return Err(WarpError::NanLossBound { trial });
        }
        Ok(Self {
            best: losses,
            updates: 0,
        })
    }

    /// The current bounds, to pass as `last_loss`.
    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.best.view()
    }

    pub fn get(&self, trial: usize) -> f64 {
        self.best[trial]
    }

    pub fn n_trials(&self) -> usize {
        self.best.len()
    }

    /// Total number of accepted improvements so far.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Lower the bound of every trial that improved in `report`.
    ///
    /// Returns the indices of those trials so the caller can keep the
    /// matching candidate knots and warps.
    pub fn accept(&mut self, report: &LossReport) -> Result<Vec<usize>> {
        if report.n_trials() != self.best.len() {
            return Err(WarpError::shape_mismatch(
                "loss report",
                &[self.best.len()],
                &[report.n_trials()],
            ));
        }

        let mut improved = Vec::new();
        for (trial, outcome) in report.outcomes().iter().enumerate() {
            if outcome.improved && outcome.loss < self.best[trial] {
                self.best[trial] = outcome.loss;
                improved.push(trial);
            }
        }
        self.updates += improved.len();

        if !improved.is_empty() {
            tracing::debug!(
                improved = improved.len(),
                total_updates = self.updates,
                "loss bound lowered"
            );
        }
        Ok(improved)
    }

    /// Sum of the current bounds. Infinite until every trial has a finite
    /// loss.
    pub fn total(&self) -> f64 {
        self.best.sum()
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::SquaredError;
    use crate::warp_loss::{WarpLossEvaluator, WarpLossInputs};
    use ndarray::{array, Array2, Array3};
    use pwarp_core::WarpKnots;

    #[test]
    fn test_new_bound_is_infinite() {
        let bound = LossBound::new(3);
        assert_eq!(bound.n_trials(), 3);
        assert!(bound.view().iter().all(|b| b.is_infinite()));
        assert!(bound.total().is_infinite());
    }

    #[test]
    fn test_from_losses_rejects_nan() {
        assert!(LossBound::from_losses(array![0.1, 0.2]).is_ok());
        assert_eq!(
            LossBound::from_losses(array![0.1, f64::NAN]).unwrap_err(),
            WarpError::NanLossBound { trial: 1 }
        );
    }

    #[test]
    fn test_accept_only_lowers() {
        let xtst = Array1::linspace(0.0, 1.0, 4);
        let template = Array2::from_shape_fn((4, 1), |(t, _)| t as f64);
        let data = Array3::from_shape_fn((2, 4, 1), |(k, t, _)| t as f64 + k as f64);
        let inputs = WarpLossInputs::new(xtst.view(), template.view(), data.view()).unwrap();
        let evaluator = WarpLossEvaluator::new();
        let mut bound = LossBound::new(2);
        let mut warps = Array2::zeros((2, 4));
        let mut new_loss = Array1::zeros(2);

        let identity = WarpKnots::identity(2, 2).unwrap();
        let report = evaluator
            .evaluate(&inputs, identity.view(), bound.view(), &SquaredError, warps.view_mut(), new_loss.view_mut())
            .unwrap();
        assert_eq!(bound.accept(&report).unwrap(), vec![0, 1]);
        assert_eq!(bound.get(0), 0.0);
        assert!((bound.get(1) - 1.0).abs() < 1e-12);

        // Trial 1 prefers a shifted warp, trial 0 gets worse and is pruned.
        let shifted = WarpKnots::new(array![[0.0, 1.0], [0.0, 1.0]], array![[1.0 / 3.0, 4.0 / 3.0], [1.0 / 3.0, 4.0 / 3.0]]).unwrap();
        let report = evaluator
            .evaluate(&inputs, shifted.view(), bound.view(), &SquaredError, warps.view_mut(), new_loss.view_mut())
            .unwrap();
        assert_eq!(bound.accept(&report).unwrap(), vec![1]);
        assert_eq!(bound.get(0), 0.0);
        assert!(bound.get(1) < 1.0);
        assert_eq!(bound.updates(), 3);
    }

    #[test]
    fn test_accept_rejects_wrong_report_size() {
        let xtst = Array1::linspace(0.0, 1.0, 3);
        let template = Array2::<f64>::zeros((3, 1));
        let data = Array3::<f64>::zeros((1, 3, 1));
        let inputs = WarpLossInputs::new(xtst.view(), template.view(), data.view()).unwrap();
        let mut warps = Array2::zeros((1, 3));
        let mut new_loss = Array1::zeros(1);
        let report = WarpLossEvaluator::new()
            .evaluate(
                &inputs,
                WarpKnots::identity(1, 2).unwrap().view(),
                array![f64::INFINITY].view(),
                &SquaredError,
                warps.view_mut(),
                new_loss.view_mut(),
            )
            .unwrap();

        let mut bound = LossBound::new(2);
        assert!(matches!(bound.accept(&report), Err(WarpError::ShapeMismatch { .. })));
    }
}
