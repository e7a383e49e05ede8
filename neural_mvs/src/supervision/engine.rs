//! Multi-scale depth supervision.

use std::collections::BTreeMap;

use burn::prelude::*;
use burn::tensor::module::{avg_pool2d, interpolate};
use burn::tensor::ops::{InterpolateMode, InterpolateOptions};
use burn::tensor::ElementConversion;

use crate::config::SupervisionConfig;
use crate::data::MvsBatch;
use crate::error::{NeuralMvsError, Result};
use crate::loss::{masked_mean, PenaltyFn};
use crate::model::DepthOutput;

use super::pyramid::{Pyramid, RefineWeighting};

/// Detached statistics of one scored depth map.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelMetrics {
    /// Mean absolute depth error over supervised pixels.
    pub abs_depth_error: f32,
    /// Fraction of supervised pixels below each threshold, in threshold order.
    pub accuracy: Vec<f32>,
    /// Number of supervised pixels.
    pub valid_pixels: f32,
}

/// Loss and metrics of one depth map.
#[derive(Debug, Clone)]
pub struct LevelScore<B: Backend> {
    /// Masked regression loss, `[1]`.
    pub loss: Tensor<B, 1>,
    /// `loss` as a host value.
    pub loss_value: f32,
    /// Detached metrics.
    pub metrics: LevelMetrics,
}

/// Result of scoring one batch.
#[derive(Debug, Clone)]
pub struct SupervisionReport<B: Backend> {
    /// Total loss to backpropagate, `[1]`.
    pub loss: Tensor<B, 1>,
    /// Weighted sum over pyramid levels, before the refinement term.
    pub initial_loss: Tensor<B, 1>,
    /// Per-level scores, finest first.
    pub levels: Vec<LevelScore<B>>,
    /// Score of the refinement head, when the model has one.
    pub refine: Option<LevelScore<B>>,
    thresholds: Vec<f32>,
}

impl<B: Backend> SupervisionReport<B> {
    /// Total loss as a host value.
    pub fn loss_value(&self) -> f32 {
        self.loss.clone().into_scalar().elem::<f32>()
    }

    /// Flat scalar map for logging and aggregation.
    ///
    /// Keys: `loss`, then per level `l` the keys `loss{l}`,
    /// `abs_depth_error{l}`, `thres{t}_accuracy{l}` and `valid_pixels{l}`. A
    /// refinement head adds `initial_loss`, `refine_loss` and `refine_*`
    /// metrics.
    pub fn to_scalars(&self) -> BTreeMap<String, f32> {
        let mut scalars = BTreeMap::new();
        scalars.insert("loss".to_string(), self.loss_value());

        for (l, level) in self.levels.iter().enumerate() {
            scalars.insert(format!("loss{l}"), level.loss_value);
            self.insert_metrics(&mut scalars, &level.metrics, "", &l.to_string());
        }

        if let Some(refine) = &self.refine {
            scalars.insert(
                "initial_loss".to_string(),
                self.initial_loss.clone().into_scalar().elem::<f32>(),
            );
            scalars.insert("refine_loss".to_string(), refine.loss_value);
            self.insert_metrics(&mut scalars, &refine.metrics, "refine_", "");
        }

        scalars
    }

    fn insert_metrics(
        &self,
        scalars: &mut BTreeMap<String, f32>,
        metrics: &LevelMetrics,
        prefix: &str,
        suffix: &str,
    ) {
        scalars.insert(
            format!("{prefix}abs_depth_error{suffix}"),
            metrics.abs_depth_error,
        );
        for (t, acc) in self.thresholds.iter().zip(&metrics.accuracy) {
            scalars.insert(format!("{prefix}thres{t}_accuracy{suffix}"), *acc);
        }
        scalars.insert(format!("{prefix}valid_pixels{suffix}"), metrics.valid_pixels);
    }
}

/// Scores model outputs against a batch over a resolution pyramid.
#[derive(Debug, Clone)]
pub struct MultiScaleSupervision<B: Backend> {
    config: SupervisionConfig,
    weights: Vec<f32>,
    penalty: PenaltyFn<B>,
}

impl<B: Backend> MultiScaleSupervision<B> {
    /// Build the engine, resolving the loss and the level weights.
    pub fn new(config: SupervisionConfig) -> Result<Self> {
        config.validate().map_err(NeuralMvsError::config)?;
        let weights = config
            .weights
            .weights(config.pyramid.levels())
            .map_err(NeuralMvsError::config)?;
        let penalty = config.loss.resolve::<B>();

        Ok(Self {
            config,
            weights,
            penalty,
        })
    }

    /// Supervision configuration.
    pub fn config(&self) -> &SupervisionConfig {
        &self.config
    }

    /// Pyramid levels the model must predict.
    pub fn pyramid(&self) -> Pyramid {
        self.config.pyramid
    }

    /// Resolved level weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Score `output` against `batch`.
    pub fn score(&self, output: &DepthOutput<B>, batch: &MvsBatch<B>) -> Result<SupervisionReport<B>> {
        let pyramid = self.config.pyramid;
        if output.depth.len() != pyramid.levels() {
            return Err(NeuralMvsError::ShapeMismatch {
                expected: vec![pyramid.levels()],
                got: vec![output.depth.len()],
            });
        }

        let n = batch.len();
        let (height, width) = batch.image_size();
        let device = batch.depth.device();

        let mut initial_loss = Tensor::<B, 1>::zeros([1], &device);
        let mut levels = Vec::with_capacity(output.depth.len());

        for (l, prediction) in output.depth.iter().enumerate() {
            let (h, w) = pyramid
                .level_size(l, height, width)
                .unwrap_or((0, 0));
            let dims = prediction.dims();
            if dims != [n, h, w] {
                return Err(NeuralMvsError::ShapeMismatch {
                    expected: vec![n, h, w],
                    got: dims.to_vec(),
                });
            }

            let score = self.score_map(prediction.clone(), batch)?;
            if score.metrics.valid_pixels == 0.0 {
                log::warn!("No supervised pixels at level {} of {:?}", l, batch.names);
            }
            initial_loss = initial_loss + score.loss.clone() * self.weights[l];
            levels.push(score);
        }

        let refine = match &output.refined_depth {
            Some(refined) => {
                let dims = refined.dims();
                if dims[0] != n {
                    return Err(NeuralMvsError::ShapeMismatch {
                        expected: vec![n, dims[1], dims[2]],
                        got: dims.to_vec(),
                    });
                }
                Some(self.score_map(refined.clone(), batch)?)
            }
            None => None,
        };

        let loss = match (&refine, self.config.refine) {
            (Some(r), RefineWeighting::ScaleInitial(rw)) => {
                initial_loss.clone() * rw + r.loss.clone()
            }
            (Some(r), RefineWeighting::ScaleRefined(rw)) => {
                initial_loss.clone() + r.loss.clone() * rw
            }
            _ => initial_loss.clone(),
        };

        Ok(SupervisionReport {
            loss,
            initial_loss,
            levels,
            refine,
            thresholds: self.config.thresholds.clone(),
        })
    }

    /// Loss and metrics of one `[N, h, w]` prediction at its own resolution.
    fn score_map(&self, prediction: Tensor<B, 3>, batch: &MvsBatch<B>) -> Result<LevelScore<B>> {
        let [n, h, w] = prediction.dims();
        if h == 0 || w == 0 {
            return Err(NeuralMvsError::ShapeMismatch {
                expected: vec![n, 1, 1],
                got: vec![n, h, w],
            });
        }

        let target = resample_depth(batch.depth.clone(), h, w);
        let mask = band_mask(target.clone(), batch);

        let error = prediction.clone() - target.clone();
        let error = if self.config.normalize_by_interval {
            error / per_sample(batch.depth_interval.clone(), [n, h, w])
        } else {
            error
        };
        let loss = masked_mean((self.penalty)(error), mask.clone());
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let abs_error = (prediction.detach() - target).abs();
        let metrics = self.metrics(abs_error, mask);

        Ok(LevelScore {
            loss,
            loss_value,
            metrics,
        })
    }

    fn metrics(&self, abs_error: Tensor<B, 3>, mask: Tensor<B, 3>) -> LevelMetrics {
        let scalar = |t: Tensor<B, 1>| t.into_scalar().elem::<f32>();

        let valid_pixels = scalar(mask.clone().sum());
        let abs_depth_error = scalar(masked_mean(abs_error.clone(), mask.clone()));
        let accuracy = self
            .config
            .thresholds
            .iter()
            .map(|&t| {
                let below = abs_error.clone().lower_elem(t).float();
                scalar(masked_mean(below, mask.clone()))
            })
            .collect();

        LevelMetrics {
            abs_depth_error,
            accuracy,
            valid_pixels,
        }
    }
}

/// Broadcast a per-sample `[N]` value over `[N, h, w]`.
fn per_sample<B: Backend>(values: Tensor<B, 1>, dims: [usize; 3]) -> Tensor<B, 3> {
    values.reshape([dims[0], 1, 1]).expand(dims)
}

/// Supervision mask of a resampled depth map from each sample's band.
fn band_mask<B: Backend>(depth: Tensor<B, 3>, batch: &MvsBatch<B>) -> Tensor<B, 3> {
    let dims = depth.dims();
    let lower = per_sample(batch.band_lower.clone(), dims);
    let upper = per_sample(batch.band_upper.clone(), dims);
    depth.clone().greater(lower).float() * depth.lower(upper).float()
}

/// Resample `[N, H, W]` depth to `h × w` by area averaging.
///
/// An integer reduction factor shared by both axes uses average pooling;
/// anything else falls back to bilinear interpolation.
pub fn resample_depth<B: Backend>(depth: Tensor<B, 3>, h: usize, w: usize) -> Tensor<B, 3> {
    let [n, height, width] = depth.dims();
    if (height, width) == (h, w) {
        return depth;
    }

    let x = depth.reshape([n, 1, height, width]);
    let factor = height / h.max(1);
    let pooled = if factor > 0 && height / factor == h && width / factor == w && width / w == factor
    {
        avg_pool2d(x, [factor, factor], [factor, factor], [0, 0], true)
    } else {
        interpolate(
            x,
            [h, w],
            InterpolateOptions::new(InterpolateMode::Bilinear),
        )
    };
    pooled.reshape([n, h, w])
}
