//! Multi-scale supervision against hand-computed values.

mod common;

use burn::prelude::*;

use common::*;
use neural_mvs::supervision::{MultiScaleSupervision, Pyramid, RefineWeighting, WeightPreset};
use neural_mvs::{DepthOutput, MvsBatch, NeuralMvsError, SupervisionConfig};
use neural_mvs::loss::RegressionLoss;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn full(value: f32, h: usize, w: usize) -> Tensor<TestBackend, 3> {
    Tensor::full([1, h, w], value, &Default::default())
}

fn output(depth: Vec<Tensor<TestBackend, 3>>) -> DepthOutput<TestBackend> {
    let confidence = depth[0].ones_like();
    DepthOutput {
        depth,
        photometric_confidence: confidence,
        refined_depth: None,
    }
}

fn batch(samples: &[mvs_io::Sample]) -> MvsBatch<TestBackend> {
    MvsBatch::from_samples(samples, &Default::default()).unwrap()
}

/// Flat 16×16 ground truth at depth 20 with one prediction per level at
/// error `l + 1`.
fn pyramid_case() -> (MvsBatch<TestBackend>, DepthOutput<TestBackend>) {
    let batch = batch(&[flat_sample(16, 20.0, 0)]);
    let depth = (0..4)
        .map(|l| full(21.0 + l as f32, 16 >> l, 16 >> l))
        .collect();
    (batch, output(depth))
}

#[test]
fn single_level_matches_plain_masked_loss() {
    // Band is (11, 40): 5 and 50 are not supervised
    let gt = vec![18.0, 19.0, 20.0, 21.0, 5.0, 50.0, 24.0, 25.0];
    let batch = batch(&[sample_with_depth(4, 2, gt, 1.0, "scan1_train/depth_map_0000.pfm")]);
    let engine = MultiScaleSupervision::<TestBackend>::new(SupervisionConfig::single_scale())
        .unwrap();

    let report = engine.score(&output(vec![full(22.0, 2, 4)]), &batch).unwrap();

    // Errors 4 3 2 1 2 3 under smooth L1: 3.5 2.5 1.5 0.5 1.5 2.5
    assert!(close(report.loss_value(), 2.0));
    let scalars = report.to_scalars();
    assert!(close(scalars["loss0"], 2.0));
    assert!(close(scalars["abs_depth_error0"], 2.5));
    assert_eq!(scalars["valid_pixels0"], 6.0);
    assert!(close(scalars["thres2_accuracy0"], 1.0 / 6.0));
    assert!(close(scalars["thres4_accuracy0"], 5.0 / 6.0));
    assert!(close(scalars["thres8_accuracy0"], 1.0));
}

#[test]
fn standard_pyramid_weights_level_losses() {
    let (batch, output) = pyramid_case();
    let config = SupervisionConfig::new().with_loss(RegressionLoss::Absolute);
    let engine = MultiScaleSupervision::<TestBackend>::new(config).unwrap();
    assert_eq!(engine.weights(), &[0.32, 0.08, 0.02, 0.01]);

    let report = engine.score(&output, &batch).unwrap();

    assert!(close(report.loss_value(), 0.32 + 0.08 * 2.0 + 0.02 * 3.0 + 0.01 * 4.0));
    let scalars = report.to_scalars();
    for (l, pixels) in [256.0, 64.0, 16.0, 4.0].into_iter().enumerate() {
        assert!(close(scalars[&format!("loss{l}")], (l + 1) as f32));
        assert_eq!(scalars[&format!("valid_pixels{l}")], pixels);
    }
    assert!(!scalars.contains_key("refine_loss"));
}

#[test]
fn custom_and_coarse_only_weights() {
    let (batch, output) = pyramid_case();
    let base = SupervisionConfig::new().with_loss(RegressionLoss::Absolute);

    let coarse = MultiScaleSupervision::<TestBackend>::new(
        base.clone().with_weights(WeightPreset::CoarseOnly),
    )
    .unwrap();
    assert!(close(coarse.score(&output, &batch).unwrap().loss_value(), 4.0));

    let custom = MultiScaleSupervision::<TestBackend>::new(
        base.with_weights(WeightPreset::Custom(vec![1.0, 1.0, 0.0, 0.0])),
    )
    .unwrap();
    assert!(close(custom.score(&output, &batch).unwrap().loss_value(), 3.0));
}

#[test]
fn mismatched_weights_are_a_config_error() {
    let config = SupervisionConfig::new()
        .with_pyramid(Pyramid::Single)
        .with_weights(WeightPreset::FrontLoaded);
    assert!(matches!(
        MultiScaleSupervision::<TestBackend>::new(config),
        Err(NeuralMvsError::InvalidConfig { .. })
    ));
}

#[test]
fn wrong_level_count_or_size_is_rejected() {
    let (batch, mut output) = pyramid_case();
    let engine = MultiScaleSupervision::<TestBackend>::new(SupervisionConfig::new()).unwrap();

    output.depth.pop();
    assert!(matches!(
        engine.score(&output, &batch),
        Err(NeuralMvsError::ShapeMismatch { .. })
    ));

    let (batch, mut output) = pyramid_case();
    output.depth[2] = full(23.0, 5, 4);
    match engine.score(&output, &batch) {
        Err(NeuralMvsError::ShapeMismatch { expected, got }) => {
            assert_eq!(expected, vec![1, 4, 4]);
            assert_eq!(got, vec![1, 5, 4]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn refinement_is_combined_by_weighting() {
    let config = SupervisionConfig::single_scale().with_loss(RegressionLoss::Absolute);
    let batch = batch(&[flat_sample(8, 20.0, 0)]);
    let mut out = output(vec![full(21.0, 8, 8)]);
    // Refined output at its own resolution, error 4
    out.refined_depth = Some(full(24.0, 4, 4));

    let score = |refine| {
        MultiScaleSupervision::<TestBackend>::new(config.clone().with_refine(refine))
            .unwrap()
            .score(&out, &batch)
            .unwrap()
    };

    let ignored = score(RefineWeighting::Ignore);
    assert!(close(ignored.loss_value(), 1.0));
    let scalars = ignored.to_scalars();
    assert!(close(scalars["refine_loss"], 4.0));
    assert!(close(scalars["initial_loss"], 1.0));
    assert_eq!(scalars["refine_valid_pixels"], 16.0);

    assert!(close(score(RefineWeighting::ScaleInitial(0.5)).loss_value(), 0.5 + 4.0));
    assert!(close(score(RefineWeighting::ScaleRefined(0.5)).loss_value(), 1.0 + 2.0));
}

#[test]
fn error_can_be_normalized_by_interval() {
    // Interval 2: band is (12, 70)
    let sample = sample_with_depth(4, 4, vec![20.0; 16], 2.0, "scan1_train/depth_map_0000.pfm");
    let batch = batch(&[sample]);
    let config = SupervisionConfig::single_scale()
        .with_loss(RegressionLoss::Absolute)
        .with_normalize_by_interval(true);
    let engine = MultiScaleSupervision::<TestBackend>::new(config).unwrap();

    let report = engine.score(&output(vec![full(24.0, 4, 4)]), &batch).unwrap();
    assert!(close(report.loss_value(), 2.0));
    // Metrics stay in depth units
    assert!(close(report.to_scalars()["abs_depth_error0"], 4.0));
}

#[test]
fn empty_mask_yields_zero_loss_and_neutral_metrics() {
    let batch = batch(&[flat_sample(4, 5.0, 0)]);
    let engine = MultiScaleSupervision::<TestBackend>::new(SupervisionConfig::single_scale())
        .unwrap();

    let report = engine.score(&output(vec![full(20.0, 4, 4)]), &batch).unwrap();
    let scalars = report.to_scalars();
    assert_eq!(scalars["loss"], 0.0);
    assert_eq!(scalars["valid_pixels0"], 0.0);
    assert_eq!(scalars["abs_depth_error0"], 0.0);
    assert_eq!(scalars["thres2_accuracy0"], 0.0);
}

#[test]
fn mask_follows_each_sample_band() {
    // Same depth, different intervals: 12 is inside (11, 40) but not (12, 70)
    let a = sample_with_depth(2, 2, vec![12.0; 4], 1.0, "scan1_train/depth_map_0000.pfm");
    let b = sample_with_depth(2, 2, vec![12.0; 4], 2.0, "scan1_train/depth_map_0001.pfm");
    let batch = batch(&[a, b]);
    let engine = MultiScaleSupervision::<TestBackend>::new(SupervisionConfig::single_scale())
        .unwrap();

    let prediction = Tensor::full([2, 2, 2], 12.0, &Default::default());
    let report = engine.score(&output(vec![prediction]), &batch).unwrap();
    assert_eq!(report.to_scalars()["valid_pixels0"], 4.0);
}
