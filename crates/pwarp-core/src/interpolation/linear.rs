//! Linear interpolation of uniformly sampled signals.
//!
//! A signal of `len` samples is read as living on `[0, 1]`, sample `i` at
//! `i / (len - 1)`. A normalized coordinate `z` therefore maps to the
//! continuous index `z * (len - 1)`.

use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, Zip};

/// Split a normalized coordinate into `(index, remainder)`.
///
/// `z` is expected in `[0, 1]`. The returned index never exceeds `last`, and
/// a coordinate landing exactly on the last sample yields `(last, 0.0)` so
/// callers never read `last + 1`.
#[inline]
fn locate(z: f64, last: usize) -> (usize, f64) {
    let pos = z * last as f64;
    // Saturating cast; NaN becomes 0 and leaves a NaN remainder.
    let i = pos as usize;
    if i >= last {
        (last, 0.0)
    } else {
        (i, pos - i as f64)
    }
}

/// Sample a one-dimensional signal at normalized coordinate `z`.
///
/// # Panics
/// Panics if `signal` is empty.
#[inline]
pub fn sample_unit(signal: ArrayView1<'_, f64>, z: f64) -> f64 {
    let last = signal.len() - 1;
    let (i, rem) = locate(z, last);
    if i == last {
        return signal[last];
    }
    (1.0 - rem) * signal[i] + rem * signal[i + 1]
}

/// Sample every column of `signal` (`[samples, features]`) at normalized
/// coordinate `z`, writing one value per feature into `out`.
#[inline]
pub fn sample_rows_into(signal: ArrayView2<'_, f64>, z: f64, mut out: ArrayViewMut1<'_, f64>) {
    let last = signal.nrows() - 1;
    let (i, rem) = locate(z, last);
    if i == last {
        out.assign(&signal.row(last));
        return;
    }
    Zip::from(&mut out)
        .and(signal.row(i))
        .and(signal.row(i + 1))
        .for_each(|o, &lo, &hi| *o = (1.0 - rem) * lo + rem * hi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_sample_unit_grid_points() {
        let signal = array![10.0, 20.0, 30.0, 40.0];
        assert_eq!(sample_unit(signal.view(), 0.0), 10.0);
        assert_eq!(sample_unit(signal.view(), 1.0), 40.0);
        assert!((sample_unit(signal.view(), 1.0 / 3.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_unit_between_points() {
        let signal = array![0.0, 2.0, 4.0];
        assert!((sample_unit(signal.view(), 0.25) - 1.0).abs() < 1e-12);
        assert!((sample_unit(signal.view(), 0.9) - 3.6).abs() < 1e-12);
    }

    #[test]
    fn test_sample_unit_nan_propagates() {
        let signal = array![0.0, 1.0];
        assert!(sample_unit(signal.view(), f64::NAN).is_nan());
    }

    #[test]
    fn test_sample_rows_into() {
        let signal = array![[0.0, 10.0], [1.0, 20.0], [2.0, 30.0]];
        let mut out = Array1::zeros(2);

        sample_rows_into(signal.view(), 0.75, out.view_mut());
        assert!((out[0] - 1.5).abs() < 1e-12);
        assert!((out[1] - 25.0).abs() < 1e-12);

        sample_rows_into(signal.view(), 1.0, out.view_mut());
        assert_eq!(out, array![2.0, 30.0]);
    }
}
