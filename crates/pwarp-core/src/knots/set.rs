//! Knot sets for per-trial piecewise-linear warps.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};

use super::segment::SegmentCursor;
use crate::error::{Result, WarpError};
use crate::validation::{validate_knots, ValidationConfig};

/// Owned knot set: one row of knots per trial.
///
/// `x` holds the knot positions on the query axis and `y` the warped
/// positions. Both are `[trials, knots]` and every row of `x` is expected to
/// be ascending on `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWarpKnots")]
pub struct WarpKnots {
    x: Array2<f64>,
    y: Array2<f64>,
}

/// Deserialized form, shape-checked through [`WarpKnots::new`].
#[derive(Deserialize)]
struct RawWarpKnots {
    x: Array2<f64>,
    y: Array2<f64>,
}

impl TryFrom<RawWarpKnots> for WarpKnots {
    type Error = WarpError;

    fn try_from(raw: RawWarpKnots) -> Result<Self> {
        Self::new(raw.x, raw.y)
    }
}

impl WarpKnots {
    /// Create a knot set from x/y arrays of identical shape.
    ///
    /// Only the shape is checked here. Ordering is checked at the entry of
    /// each batch call, see [`ValidationConfig`].
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Result<Self> {
        check_shapes(x.view(), y.view())?;
        Ok(Self { x, y })
    }

    /// Single-trial knot set.
    pub fn single(x: &[f64], y: &[f64]) -> Result<Self> {
        let x = Array2::from_shape_vec((1, x.len()), x.to_vec())
            .map_err(|e| WarpError::invalid_configuration(e.to_string()))?;
        let y = Array2::from_shape_vec((1, y.len()), y.to_vec())
            .map_err(|e| WarpError::invalid_configuration(e.to_string()))?;
        Self::new(x, y)
    }

    /// Identity warp on `[0, 1]` with evenly spaced knots.
    pub fn identity(n_trials: usize, n_knots: usize) -> Result<Self> {
        if n_knots < 2 {
            return Err(WarpError::TooFewKnots { found: n_knots });
        }
        let row = Array1::linspace(0.0, 1.0, n_knots);
        let x = row
            .broadcast((n_trials, n_knots))
            .map(|b| b.to_owned())
            .ok_or_else(|| WarpError::invalid_configuration("cannot broadcast identity knots"))?;
        Ok(Self { y: x.clone(), x })
    }

    /// The inverse warp, obtained by swapping the roles of x and y.
    ///
    /// Only increasing warps are invertible; the swapped knots are checked
    /// for ordering and an error is returned otherwise.
    pub fn inverse(&self) -> Result<Self> {
        let inverse = Self {
            x: self.y.clone(),
            y: self.x.clone(),
        };
        validate_knots(inverse.view(), &ValidationConfig::default())?;
        Ok(inverse)
    }

    pub fn n_trials(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_knots(&self) -> usize {
        self.x.ncols()
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView2<'_, f64> {
        self.y.view()
    }

    /// Mutable access to both coordinate arrays, e.g. to copy an accepted
    /// candidate row into place.
    pub fn rows_mut(&mut self, trial: usize) -> (ArrayViewMut1<'_, f64>, ArrayViewMut1<'_, f64>) {
        (
            self.x.index_axis_mut(Axis(0), trial),
            self.y.index_axis_mut(Axis(0), trial),
        )
    }

    /// Borrow the knot set.
    pub fn view(&self) -> KnotsView<'_> {
        KnotsView {
            x: self.x.view(),
            y: self.y.view(),
        }
    }
}

/// Borrowed knot set. This is what every evaluation primitive consumes, so
/// candidate knots built by a search loop never need to be copied.
#[derive(Debug, Clone, Copy)]
pub struct KnotsView<'a> {
    x: ArrayView2<'a, f64>,
    y: ArrayView2<'a, f64>,
}

impl<'a> KnotsView<'a> {
    pub fn new(x: ArrayView2<'a, f64>, y: ArrayView2<'a, f64>) -> Result<Self> {
        check_shapes(x, y)?;
        Ok(Self { x, y })
    }

    pub fn n_trials(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_knots(&self) -> usize {
        self.x.ncols()
    }

    pub fn x(&self) -> ArrayView2<'a, f64> {
        self.x
    }

    pub fn y(&self) -> ArrayView2<'a, f64> {
        self.y
    }

    /// Warp function of one trial.
    ///
    /// # Panics
    /// Panics if `trial >= n_trials()`.
    pub fn trial(&self, trial: usize) -> TrialKnots<'a> {
        TrialKnots {
            x: self.x.index_axis_move(Axis(0), trial),
            y: self.y.index_axis_move(Axis(0), trial),
        }
    }
}

/// The piecewise-linear warp function of a single trial.
#[derive(Debug, Clone, Copy)]
pub struct TrialKnots<'a> {
    x: ArrayView1<'a, f64>,
    y: ArrayView1<'a, f64>,
}

impl<'a> TrialKnots<'a> {
    /// Build from one row of x and y knots. Callers guarantee equal lengths
    /// of at least two.
    pub fn new(x: ArrayView1<'a, f64>, y: ArrayView1<'a, f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        debug_assert!(x.len() >= 2);
        Self { x, y }
    }

    pub fn x(&self) -> ArrayView1<'a, f64> {
        self.x
    }

    pub fn y(&self) -> ArrayView1<'a, f64> {
        self.y
    }

    /// Cursor for a monotone sweep over query times.
    pub fn cursor(&self) -> SegmentCursor<'a> {
        SegmentCursor::new(self.x, self.y)
    }

    /// Index `n` of the right end of the segment that covers `t`.
    ///
    /// This is the first knot with `x[n] >= t`, kept in `1..=len-1` so that
    /// queries outside the knots use the first or last segment.
    fn segment_end(&self, t: f64) -> usize {
        let last = self.x.len() - 1;
        let n = match self.x.as_slice() {
            Some(xs) => xs.partition_point(|&k| k < t),
            None => self.x.iter().take_while(|&&k| k < t).count(),
        };
        n.clamp(1, last)
    }

    /// Evaluate the warp at `t` by binary search.
    ///
    /// Outside the knots the first and last segments are extended linearly.
    /// For every `t` this agrees bit for bit with a [`SegmentCursor`] sweep.
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.segment_end(t);
        let x0 = self.x[n - 1];
        let y0 = self.y[n - 1];
        let slope = (self.y[n] - y0) / (self.x[n] - x0);
        y0 + slope * (t - x0)
    }

    /// Evaluate the warp at `t`, holding the end values flat outside the
    /// knots.
    pub fn evaluate_clamped(&self, t: f64) -> f64 {
        let p = self.segment_end(t);
        let lam = (t - self.x[p - 1]) / (self.x[p] - self.x[p - 1]);
        if lam > 1.0 {
            self.y[self.y.len() - 1]
        } else if lam < 0.0 {
            self.y[0]
        } else {
            self.y[p - 1] * (1.0 - lam) + self.y[p] * lam
        }
    }
}

fn check_shapes(x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> Result<()> {
    if x.dim() != y.dim() {
        return Err(WarpError::shape_mismatch("knot y-coordinates", x.shape(), y.shape()));
    }
    if x.ncols() < 2 {
        return Err(WarpError::TooFewKnots { found: x.ncols() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_rejects_mismatched_shapes() {
        let err = WarpKnots::new(array![[0.0, 1.0]], array![[0.0, 0.5, 1.0]]).unwrap_err();
        assert!(matches!(err, WarpError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_single_knot() {
        let err = WarpKnots::new(array![[0.0]], array![[0.0]]).unwrap_err();
        assert_eq!(err, WarpError::TooFewKnots { found: 1 });
    }

    #[test]
    fn test_identity() {
        let knots = WarpKnots::identity(3, 5).unwrap();
        assert_eq!(knots.n_trials(), 3);
        assert_eq!(knots.n_knots(), 5);
        assert_eq!(knots.x(), knots.y());
        assert_eq!(knots.x()[[2, 4]], 1.0);
        let trial = knots.view().trial(1);
        assert!((trial.evaluate(0.37) - 0.37).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_extends_end_segments() {
        let knots = WarpKnots::single(&[0.0, 0.5, 1.0], &[0.0, 1.0, 0.0]).unwrap();
        let trial = knots.view().trial(0);
        assert!((trial.evaluate(-0.25) - -0.5).abs() < 1e-12);
        assert!((trial.evaluate(1.25) - -0.5).abs() < 1e-12);
        assert!((trial.evaluate(0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_clamped_holds_end_values() {
        let knots = WarpKnots::single(&[0.2, 0.5, 0.8], &[0.1, 0.6, 0.9]).unwrap();
        let trial = knots.view().trial(0);
        assert_eq!(trial.evaluate_clamped(0.0), 0.1);
        assert_eq!(trial.evaluate_clamped(1.0), 0.9);
        assert!((trial.evaluate_clamped(0.35) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_inverse() {
        let knots = WarpKnots::single(&[0.0, 0.5, 1.0], &[0.0, 0.25, 1.0]).unwrap();
        let inverse = knots.inverse().unwrap();
        let forward = knots.view().trial(0);
        let backward = inverse.view().trial(0);
        for &t in &[0.1, 0.4, 0.5, 0.9] {
            assert!((backward.evaluate(forward.evaluate(t)) - t).abs() < 1e-12);
        }
    }

    #[test]
    fn test_inverse_rejects_decreasing_warp() {
        let knots = WarpKnots::single(&[0.0, 0.5, 1.0], &[0.0, 1.0, 0.0]).unwrap();
        assert!(matches!(
            knots.inverse(),
            Err(WarpError::InvalidKnotOrdering { trial: 0, knot: 1, .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let knots = WarpKnots::single(&[0.0, 0.3, 1.0], &[0.0, 0.4, 1.0]).unwrap();
        let json = serde_json::to_string(&knots).unwrap();
        let restored: WarpKnots = serde_json::from_str(&json).unwrap();
        assert_eq!(knots, restored);
    }

    #[test]
    fn test_deserialize_rejects_invalid_shapes() {
        let one_knot = r#"{"x":{"v":1,"dim":[1,1],"data":[0.0]},"y":{"v":1,"dim":[1,1],"data":[0.0]}}"#;
        let err = serde_json::from_str::<WarpKnots>(one_knot).unwrap_err();
        assert!(err.to_string().contains("knot"), "{err}");

        let mismatched = r#"{"x":{"v":1,"dim":[1,3],"data":[0.0,0.5,1.0]},"y":{"v":1,"dim":[1,2],"data":[0.0,1.0]}}"#;
        assert!(serde_json::from_str::<WarpKnots>(mismatched).is_err());
    }
}
