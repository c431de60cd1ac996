//! Precondition checks for batch warp evaluation.
//!
//! The inner loops assume sorted knots, at least two knots per trial,
//! matching array shapes and ascending query times. These checks run once at
//! the entry of a batch call, which is cheap next to the O(T) sweeps they
//! guard.

use ndarray::ArrayView1;

use crate::error::{Result, WarpError};
use crate::knots::KnotsView;

/// Validation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Check that output buffers and data arrays agree in shape.
    pub validate_shapes: bool,
    /// Check knot finiteness, ordering and spacing.
    pub check_knots: bool,
    /// Check that query sequences swept by a cursor are ascending.
    pub check_query_order: bool,
    /// Adjacent knots closer than this are rejected as degenerate.
    pub min_knot_spacing: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_shapes: true,
            check_knots: true,
            check_query_order: true,
            min_knot_spacing: 0.0,
        }
    }
}

impl ValidationConfig {
    /// Create a new validation config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip every check. For callers that validated their inputs already,
    /// e.g. a search loop re-scoring knots it constructed itself.
    pub fn unchecked() -> Self {
        Self {
            validate_shapes: false,
            check_knots: false,
            check_query_order: false,
            min_knot_spacing: 0.0,
        }
    }

    /// Disable shape validation.
    pub fn without_shape_validation(mut self) -> Self {
        self.validate_shapes = false;
        self
    }

    /// Disable knot checks.
    pub fn without_knot_checks(mut self) -> Self {
        self.check_knots = false;
        self
    }

    /// Disable the ascending-query check.
    pub fn without_query_order_check(mut self) -> Self {
        self.check_query_order = false;
        self
    }

    /// Set the minimum spacing between adjacent knots.
    pub fn with_min_knot_spacing(mut self, spacing: f64) -> Self {
        self.min_knot_spacing = spacing;
        self
    }

    /// Check the configuration itself.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_knot_spacing >= 0.0) {
            return Err(WarpError::invalid_configuration(format!(
                "min_knot_spacing must be non-negative, got {}",
                self.min_knot_spacing
            )));
        }
        Ok(())
    }
}

/// Validate every trial's knots: finite coordinates, ascending x and a
/// spacing above `config.min_knot_spacing`.
pub fn validate_knots(knots: KnotsView<'_>, config: &ValidationConfig) -> Result<()> {
    if !config.check_knots {
        return Ok(());
    }
    config.validate()?;

    for trial in 0..knots.n_trials() {
        let warp = knots.trial(trial);
        let (x, y) = (warp.x(), warp.y());

        for knot in 0..x.len() {
            if !x[knot].is_finite() || !y[knot].is_finite() {
                return Err(WarpError::NonFiniteKnot { trial, knot });
            }
        }

        for knot in 0..x.len() - 1 {
            let (left, right) = (x[knot], x[knot + 1]);
            if right < left {
                return Err(WarpError::InvalidKnotOrdering {
                    trial,
                    knot,
                    left,
                    right,
                });
            }
            let spacing = right - left;
            if spacing <= config.min_knot_spacing {
                return Err(WarpError::DegenerateKnotSpacing {
                    trial,
                    knot,
                    spacing,
                });
            }
        }
    }

    Ok(())
}

/// Validate that a query sequence is ascending.
pub fn validate_ascending(queries: ArrayView1<'_, f64>, config: &ValidationConfig) -> Result<()> {
    if !config.check_query_order {
        return Ok(());
    }
    for index in 1..queries.len() {
        let (previous, next) = (queries[index - 1], queries[index]);
        // NaN never compares as ascending
        if !(previous <= next) {
            return Err(WarpError::UnsortedQueries {
                index,
                previous,
                next,
            });
        }
    }
    Ok(())
}

/// Validate that an array has the expected shape.
pub fn validate_shape(
    context: &'static str,
    expected: &[usize],
    actual: &[usize],
    config: &ValidationConfig,
) -> Result<()> {
    if config.validate_shapes && expected != actual {
        return Err(WarpError::shape_mismatch(context, expected, actual));
    }
    Ok(())
}

/// Validate that a uniform grid has at least two samples. A single sample
/// has no `T - 1` spacing to normalize by.
pub fn validate_grid_len(context: &'static str, len: usize) -> Result<()> {
    if len < 2 {
        return Err(WarpError::TooFewSamples { context, found: len });
    }
    Ok(())
}
