//! Batched warp evaluation at arbitrary `(trial, x)` queries.

use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

use crate::error::{Result, WarpError};
use crate::knots::KnotsView;
use crate::parallel::Parallelism;
use crate::validation::{validate_knots, validate_shape, ValidationConfig};

/// Sparse warp evaluator.
///
/// Each query `q` is evaluated on the warp of trial `trials[q]`. Queries
/// may come in any order and trials need not be contiguous. Outside a
/// trial's knots the result is held flat at the first or last knot value
/// rather than extrapolated.
#[derive(Debug, Clone, Default)]
pub struct SparseEvaluator {
    validation: ValidationConfig,
    parallelism: Parallelism,
}

impl SparseEvaluator {
    /// Create a new sparse evaluator with default validation, running serially.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Evaluate all queries into a new array.
    pub fn evaluate(
        &self,
        knots: KnotsView<'_>,
        trials: ArrayView1<'_, usize>,
        xtst: ArrayView1<'_, f64>,
    ) -> Result<Array1<f64>> {
        let mut ytst = Array1::zeros(xtst.len());
        self.evaluate_into(knots, trials, xtst, ytst.view_mut())?;
        Ok(ytst)
    }

    /// Evaluate all queries, writing `ytst[q]` for every query `q`.
    ///
    /// # Arguments
    /// * `knots` - Per-trial knots `[trials, knots]`, x ascending per row
    /// * `trials` - Trial index of each query `[Q]`
    /// * `xtst` - Query coordinates `[Q]`
    /// * `ytst` - Output buffer `[Q]`
    pub fn evaluate_into(
        &self,
        knots: KnotsView<'_>,
        trials: ArrayView1<'_, usize>,
        xtst: ArrayView1<'_, f64>,
        ytst: ArrayViewMut1<'_, f64>,
    ) -> Result<()> {
        // Trial indices are always checked: an out-of-range row would panic.
        validate_shape("trial assignment", xtst.shape(), trials.shape(), &ValidationConfig::default())?;
        validate_shape("sparse output", xtst.shape(), ytst.shape(), &ValidationConfig::default())?;
        let n_trials = knots.n_trials();
        if let Some((query, &trial)) = trials.iter().enumerate().find(|&(_, &t)| t >= n_trials) {
            return Err(WarpError::TrialOutOfRange {
                query,
                trial,
                n_trials,
            });
        }
        validate_knots(knots, &self.validation)?;

        tracing::debug!(queries = xtst.len(), trials = n_trials, "sparse warp evaluation");

        let zip = Zip::from(ytst).and(trials).and(xtst);
        let eval = |y: &mut f64, &trial: &usize, &x: &f64| {
            *y = knots.trial(trial).evaluate_clamped(x);
        };
        match self.parallelism {
            Parallelism::Serial => zip.for_each(eval),
            Parallelism::Rayon => zip.par_for_each(eval),
        }
        Ok(())
    }
}
