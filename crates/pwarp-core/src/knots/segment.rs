//! Monotone line-segment cursor over one trial's knots.

use ndarray::ArrayView1;

/// Line-segment cursor for sweeping a warp at ascending query times.
///
/// The cursor holds the active segment as `(x0, y0, slope)` plus the index
/// `n` of its right knot. Because queries only move forward, advancing is
/// amortized O(knots) over a whole sweep instead of one search per query.
/// Queries before the first knot or past the last one extend the first or
/// last segment linearly; the boundary policy is left to the caller.
#[derive(Debug, Clone)]
pub struct SegmentCursor<'a> {
    x: ArrayView1<'a, f64>,
    y: ArrayView1<'a, f64>,
    x0: f64,
    y0: f64,
    slope: f64,
    n: usize,
}

impl<'a> SegmentCursor<'a> {
    /// Cursor on the first segment. Needs at least two knots.
    pub fn new(x: ArrayView1<'a, f64>, y: ArrayView1<'a, f64>) -> Self {
        let x0 = x[0];
        let y0 = y[0];
        Self {
            x,
            y,
            x0,
            y0,
            slope: (y[1] - y0) / (x[1] - x0),
            n: 1,
        }
    }

    /// Move forward until the active segment covers `t` or the last segment
    /// is reached. Never moves backwards.
    #[inline]
    pub fn advance_to(&mut self, t: f64) {
        let last = self.x.len() - 1;
        while self.n < last && t > self.x[self.n] {
            self.x0 = self.x[self.n];
            self.y0 = self.y[self.n];
            self.slope = (self.y[self.n + 1] - self.y0) / (self.x[self.n + 1] - self.x0);
            self.n += 1;
        }
    }

    /// Value of the active segment's line at `t`.
    #[inline]
    pub fn value_at(&self, t: f64) -> f64 {
        self.y0 + self.slope * (t - self.x0)
    }

    /// Advance to `t`, then evaluate there.
    #[inline]
    pub fn eval(&mut self, t: f64) -> f64 {
        self.advance_to(t);
        self.value_at(t)
    }

    /// Index of the active segment (`0` is `[x[0], x[1]]`).
    pub fn segment(&self) -> usize {
        self.n - 1
    }
}
