//! Deterministic synthetic trials for benchmarking.
//!
//! Every trial is the template shifted in time by a known amount plus a small
//! deterministic ripple, so the best pure-shift warp of each trial is known.

use std::f64::consts::TAU;

use anyhow::Result;
use ndarray::{Array1, Array2, Array3};
use pwarp_core::WarpKnots;

/// Shapes of a synthetic dataset.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticShape {
    pub trials: usize,
    pub timepoints: usize,
    pub features: usize,
    pub knots: usize,
}

/// Template, data and the true shift of every trial.
pub struct SyntheticTrials {
    pub xtst: Array1<f64>,
    pub template: Array2<f64>,
    pub data: Array3<f64>,
    pub shifts: Array1<f64>,
}

fn signal(feature: usize, t: f64) -> f64 {
    (TAU * (feature + 1) as f64 * t).sin()
}

impl SyntheticTrials {
    pub fn generate(shape: SyntheticShape) -> Self {
        let last = (shape.timepoints - 1) as f64;
        let xtst = Array1::linspace(0.0, 1.0, shape.timepoints);
        let template = Array2::from_shape_fn((shape.timepoints, shape.features), |(t, f)| {
            signal(f, t as f64 / last)
        });
        let shifts = Array1::from_shape_fn(shape.trials, |k| 0.1 * (k as f64 * 1.3).sin());
        let data = Array3::from_shape_fn((shape.trials, shape.timepoints, shape.features), |(k, t, f)| {
            let ripple = 0.05 * ((37 * t + 11 * k + 5 * f) as f64).sin();
            signal(f, t as f64 / last + shifts[k]) + ripple
        });
        Self {
            xtst,
            template,
            data,
            shifts,
        }
    }

    /// First feature of every trial, `[trials, T]`.
    pub fn first_feature(&self) -> Array2<f64> {
        self.data.index_axis(ndarray::Axis(2), 0).to_owned()
    }
}

/// Candidate `c`: every trial shifted by the same amount, taken from a
/// low-discrepancy sequence over `[-0.2, 0.2]`.
pub fn shift_candidate(c: usize, shape: SyntheticShape) -> Result<(f64, WarpKnots)> {
    let phase = (c as f64 * 0.618_033_988_749_895).fract();
    let shift = -0.2 + 0.4 * phase;
    let row = Array1::linspace(0.0, 1.0, shape.knots);
    let x = Array2::from_shape_fn((shape.trials, shape.knots), |(_, n)| row[n]);
    let y = &x + shift;
    Ok((shift, WarpKnots::new(x, y)?))
}
