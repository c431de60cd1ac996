//! Squared error loss.

use ndarray::{ArrayView1, Zip};

use super::trait_::PointwiseLoss;

/// Squared error summed over features: `sum((p - o)^2)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredError;

impl SquaredError {
    pub fn new() -> Self {
        Self
    }
}

impl PointwiseLoss for SquaredError {
    #[inline]
    fn loss(&self, prediction: ArrayView1<'_, f64>, observation: ArrayView1<'_, f64>) -> f64 {
        Zip::from(prediction)
            .and(observation)
            .fold(0.0, |acc, &p, &o| acc + (p - o) * (p - o))
    }

    fn name(&self) -> &'static str {
        "squared_error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_squared_error() {
        let loss = SquaredError::new();
        assert_eq!(loss.loss(array![1.0, 2.0].view(), array![1.0, 2.0].view()), 0.0);
        assert_eq!(loss.loss(array![1.0, 2.0].view(), array![3.0, 5.0].view()), 13.0);
    }
}
