//! Property-based tests for hypotheses, bands and projection operators.

use nalgebra::{Matrix3, Matrix4};
use proptest::prelude::*;

use mvs_core::{generate_hypotheses, DepthBand, DepthMode, ProjectionOperator};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn linear_has_exact_count_and_constant_step(
        depth_min in 0.1f32..1000.0,
        interval in 0.01f32..10.0,
        ndepths in 1usize..256,
    ) {
        let h = generate_hypotheses(depth_min, interval, ndepths, DepthMode::Linear).unwrap();
        let v = h.as_slice();
        prop_assert_eq!(v.len(), ndepths);

        let tolerance = 4.0 * f32::EPSILON * v[v.len() - 1].abs() + 1e-6;
        for pair in v.windows(2) {
            prop_assert!(pair[1] > pair[0]);
            prop_assert!(((pair[1] - pair[0]) - interval).abs() <= tolerance);
        }
    }

    #[test]
    fn inverse_has_exact_count_and_even_reciprocals(
        depth_min in 0.1f32..1000.0,
        interval in 0.01f32..10.0,
        ndepths in 1usize..256,
    ) {
        let h = generate_hypotheses(depth_min, interval, ndepths, DepthMode::Inverse).unwrap();
        let v = h.as_slice();
        prop_assert_eq!(v.len(), ndepths);

        for pair in v.windows(2) {
            prop_assert!(pair[1] > pair[0]);
        }

        let reciprocals: Vec<f64> = v.iter().map(|&d| 1.0 / d as f64).collect();
        if reciprocals.len() > 1 {
            // f32 storage perturbs each reciprocal by a few ulps
            let rounding = 4.0 * f32::EPSILON as f64 * reciprocals[0];
            let step = (reciprocals[reciprocals.len() - 1] - reciprocals[0])
                / (reciprocals.len() - 1) as f64;
            for pair in reciprocals.windows(2) {
                let diff = pair[1] - pair[0];
                prop_assert!((diff - step).abs() <= 1e-3 * step.abs() + rounding);
            }
        }

        let depth_end = depth_min as f64 + ndepths as f64 * interval as f64;
        prop_assert!((v[v.len() - 1] as f64) < depth_end);
    }

    #[test]
    fn band_excludes_its_bounds(
        depth_min in 1.0f32..1000.0,
        interval in 0.1f32..10.0,
        ndepths in 4usize..256,
    ) {
        let band = DepthBand::new(depth_min, interval, ndepths);
        prop_assert!(!band.contains(band.lower()));
        prop_assert!(!band.contains(band.upper()));
        let mid = 0.5 * (band.lower() + band.upper());
        prop_assert!(band.contains(mid));
    }

    #[test]
    fn projection_bottom_row_matches_extrinsics(
        values in proptest::collection::vec(-100.0f32..100.0, 16),
        fx in 1.0f32..1000.0,
        fy in 1.0f32..1000.0,
    ) {
        let extrinsics = Matrix4::from_row_slice(&values);
        let intrinsics = Matrix3::new(fx, 0.0, 10.0, 0.0, fy, 20.0, 0.0, 0.0, 1.0);

        let a = ProjectionOperator::from_calibration(&intrinsics, &extrinsics);
        let b = ProjectionOperator::from_calibration(&intrinsics, &extrinsics);
        prop_assert_eq!(a, b);
        for col in 0..4 {
            prop_assert_eq!(a.matrix()[(3, col)], extrinsics[(3, col)]);
        }
    }
}
