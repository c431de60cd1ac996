//! Absolute error loss.

use ndarray::{ArrayView1, Zip};

use super::trait_::PointwiseLoss;

/// Absolute error summed over features: `sum(|p - o|)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsoluteError;

impl AbsoluteError {
    pub fn new() -> Self {
        Self
    }
}

impl PointwiseLoss for AbsoluteError {
    #[inline]
    fn loss(&self, prediction: ArrayView1<'_, f64>, observation: ArrayView1<'_, f64>) -> f64 {
        Zip::from(prediction)
            .and(observation)
            .fold(0.0, |acc, &p, &o| acc + (p - o).abs())
    }

    fn name(&self) -> &'static str {
        "absolute_error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_absolute_error() {
        let loss = AbsoluteError::new();
        assert_eq!(loss.loss(array![1.0, -2.0].view(), array![3.0, 1.0].view()), 5.0);
    }
}
