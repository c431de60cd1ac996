use ndarray::{Array1, Array2};
use proptest::prelude::*;
use pwarp_core::{DenseResampler, SparseEvaluator, WarpKnots};

/// Ascending knot positions spanning `[0, 1]` built from positive gaps.
fn knot_positions(gaps: &[f64]) -> Vec<f64> {
    let total: f64 = gaps.iter().sum();
    let mut positions = Vec::with_capacity(gaps.len() + 1);
    let mut acc = 0.0;
    positions.push(0.0);
    for gap in &gaps[..gaps.len() - 1] {
        acc += gap / total;
        positions.push(acc);
    }
    positions.push(1.0);
    positions
}

fn warp_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..8).prop_flat_map(|n_knots| {
        (
            prop::collection::vec(0.05f64..1.0, n_knots - 1),
            prop::collection::vec(-0.2f64..1.2, n_knots),
        )
            .prop_map(|(gaps, ys)| (knot_positions(&gaps), ys))
    })
}

proptest! {
    #[test]
    fn test_cursor_matches_binary_search(
        (xs, ys) in warp_strategy(),
        mut queries in prop::collection::vec(-0.5f64..1.5, 1..60),
    ) {
        queries.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let knots = WarpKnots::single(&xs, &ys).unwrap();
        let warp = knots.view().trial(0);
        let mut cursor = warp.cursor();

        for &t in &queries {
            let swept = cursor.eval(t);
            let searched = warp.evaluate(t);
            prop_assert_eq!(swept, searched, "t = {}", t);
        }
    }

    #[test]
    fn test_sparse_stays_within_knot_values(
        (xs, ys) in warp_strategy(),
        queries in prop::collection::vec(-1.0f64..2.0, 1..40),
    ) {
        let knots = WarpKnots::single(&xs, &ys).unwrap();
        let xtst = Array1::from(queries.clone());
        let trials = Array1::<usize>::zeros(queries.len());
        let ytst = SparseEvaluator::new()
            .evaluate(knots.view(), trials.view(), xtst.view())
            .unwrap();

        let lo = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for (q, &x) in queries.iter().enumerate() {
            if x < 0.0 {
                prop_assert_eq!(ytst[q], ys[0]);
            } else if x > 1.0 {
                prop_assert_eq!(ytst[q], ys[ys.len() - 1]);
            }
            prop_assert!(ytst[q] >= lo - 1e-12 && ytst[q] <= hi + 1e-12);
        }
    }

    #[test]
    fn test_dense_identity_roundtrip(
        n_knots in 2usize..6,
        samples in prop::collection::vec(-10.0f64..10.0, 2..40),
    ) {
        let knots = WarpKnots::identity(1, n_knots).unwrap();
        let data = Array2::from_shape_vec((1, samples.len()), samples.clone()).unwrap();
        let out = DenseResampler::new().resample(knots.view(), data.view()).unwrap();

        for (t, &want) in samples.iter().enumerate() {
            prop_assert!((out[[0, t]] - want).abs() < 1e-9, "t = {}: {} vs {}", t, out[[0, t]], want);
        }
    }
}
