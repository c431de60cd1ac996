//! Dense resampling of trial signals through their warps.
//!
//! This module provides [`DenseResampler`], which maps each trial's signal
//! onto the uniform output grid through that trial's warp.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip};

use crate::error::Result;
use crate::interpolation::sample_unit;
use crate::knots::{KnotsView, TrialKnots};
use crate::parallel::Parallelism;
use crate::validation::{validate_grid_len, validate_knots, validate_shape, ValidationConfig};

/// Dense resampler.
///
/// For trial `k` and output sample `t` of `T`, the warp is evaluated at the
/// normalized time `t / (T - 1)` giving `z`, and `data[k]` is linearly
/// interpolated at the raw index `z * (T - 1)`.
///
/// Warped times outside `[0, 1]` have no source sample and are written as
/// `NaN` (missing). This differs from the flat clamping of
/// [`SparseEvaluator`](crate::SparseEvaluator).
#[derive(Debug, Clone, Default)]
pub struct DenseResampler {
    validation: ValidationConfig,
    parallelism: Parallelism,
}

impl DenseResampler {
    /// Create a new dense resampler with default validation, running serially.
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

    /// Resample `data` (`[trials, T]`) into a new array of the same shape.
    pub fn resample(&self, knots: KnotsView<'_>, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let mut out = Array2::zeros(data.raw_dim());
        self.resample_into(knots, data, out.view_mut())?;
        Ok(out)
    }

    /// Resample `data` (`[trials, T]`) into `out` (`[trials, T]`).
    pub fn resample_into(
        &self,
        knots: KnotsView<'_>,
        data: ArrayView2<'_, f64>,
        mut out: ArrayViewMut2<'_, f64>,
    ) -> Result<()> {
        // Row pairing below relies on these regardless of configuration.
        validate_shape("resampled output", data.shape(), out.shape(), &ValidationConfig::default())?;
        validate_shape(
            "data trials",
            &[knots.n_trials()],
            &[data.nrows()],
            &ValidationConfig::default(),
        )?;
        validate_grid_len("resampling grid", data.ncols())?;
        validate_knots(knots, &self.validation)?;

        tracing::debug!(trials = data.nrows(), samples = data.ncols(), "dense resampling");

        let (knots_x, knots_y) = (knots.x(), knots.y());
        let zip = Zip::from(out.rows_mut())
            .and(data.rows())
            .and(knots_x.rows())
            .and(knots_y.rows());
        // x and y rows must share one lifetime for `TrialKnots::new`.
        let resample = |out_row: ArrayViewMut1<'_, f64>, signal: ArrayView1<'_, f64>, x, y| {
            resample_trial(TrialKnots::new(x, y), signal, out_row);
        };
        match self.parallelism {
            Parallelism::Serial => zip.for_each(resample),
            Parallelism::Rayon => zip.par_for_each(resample),
        }
        Ok(())
    }
}

/// Resample one trial. `signal` and `out` have the same length, at least 2.
fn resample_trial(warp: TrialKnots<'_>, signal: ArrayView1<'_, f64>, mut out: ArrayViewMut1<'_, f64>) {
    let last = (signal.len() - 1) as f64;
    let mut cursor = warp.cursor();

    for (t, slot) in out.iter_mut().enumerate() {
        let z = cursor.eval(t as f64 / last);
        *slot = if z < 0.0 || z > 1.0 {
            f64::NAN
        } else {
            sample_unit(signal, z)
        };
    }
}
