//! Error types for warp evaluation.
//!
//! Every batch entry point checks its preconditions once, before any inner
//! loop runs, and reports violations through [`WarpError`]. The inner loops
//! themselves never fail.

use thiserror::Error;

/// Main error type for warp evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarpError {
    /// Knot x-coordinates of a trial are not sorted ascending.
    #[error("Invalid knot ordering in trial {trial}: knot {knot} at {left} is followed by {right}")]
    InvalidKnotOrdering {
        trial: usize,
        knot: usize,
        left: f64,
        right: f64,
    },

    /// Two adjacent knots are (nearly) coincident.
    #[error("Degenerate knot spacing in trial {trial}: knot {knot} is {spacing} from its successor")]
    DegenerateKnotSpacing {
        trial: usize,
        knot: usize,
        spacing: f64,
    },

    /// A warp needs at least two knots.
    #[error("Too few knots: need at least 2 per trial, got {found}")]
    TooFewKnots { found: usize },

    /// A knot coordinate is NaN or infinite.
    #[error("Non-finite knot coordinate in trial {trial} at knot {knot}")]
    NonFiniteKnot { trial: usize, knot: usize },

    /// Shape mismatch between arrays of one call.
    #[error("Shape mismatch for {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A sparse query names a trial that has no knots.
    #[error("Query {query} refers to trial {trial}, but only {n_trials} trials exist")]
    TrialOutOfRange {
        query: usize,
        trial: usize,
        n_trials: usize,
    },

    /// Query times must be ascending.
    #[error("Query times not ascending at index {index}: {previous} > {next}")]
    UnsortedQueries {
        index: usize,
        previous: f64,
        next: f64,
    },

    /// A uniform grid needs at least two samples.
    #[error("Too few samples for {context}: need at least 2, got {found}")]
    TooFewSamples { context: &'static str, found: usize },

    /// A loss bound is NaN, so no comparison against it is meaningful.
    #[error("Loss bound for trial {trial} is NaN")]
    NanLossBound { trial: usize },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for warp evaluation.
pub type Result<T> = std::result::Result<T, WarpError>;

impl WarpError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(context: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WarpError::invalid_configuration("negative spacing");
        assert_eq!(err.to_string(), "Invalid configuration: negative spacing");
    }

    #[test]
    fn test_shape_mismatch() {
        let err = WarpError::shape_mismatch("output buffer", &[3, 10], &[3, 9]);
        assert!(matches!(err, WarpError::ShapeMismatch { context: "output buffer", .. }));
        let err_str = err.to_string();
        assert!(err_str.contains("expected [3, 10]"));
        assert!(err_str.contains("got [3, 9]"));
    }

    #[test]
    fn test_knot_ordering_message() {
        let err = WarpError::InvalidKnotOrdering {
            trial: 2,
            knot: 1,
            left: 0.6,
            right: 0.4,
        };
        assert_eq!(
            err.to_string(),
            "Invalid knot ordering in trial 2: knot 1 at 0.6 is followed by 0.4"
        );
    }
}
