//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use burn::backend::{Autodiff, NdArray};
use burn::module::{AutodiffModule, Module, Param};
use burn::optim::Optimizer;
use burn::prelude::*;
use nalgebra::{Matrix3, Matrix4};

use mvs_core::{generate_hypotheses, CameraParams, DepthBand, DepthMap, DepthMode};
use mvs_io::{ImageChw, MvsIoError, Sample, SampleSource};
use neural_mvs::training::build_adam;
use neural_mvs::{DepthModel, DepthOutput, TrainingConfig};

pub type TestBackend = NdArray;
pub type TestAutodiffBackend = Autodiff<NdArray>;

pub const DEPTH_MIN: f32 = 10.0;
pub const NDEPTHS: usize = 32;

/// Predicts a constant plane per level: the mean hypothesis plus a learned
/// offset. The number of offsets is the number of pyramid levels, level `l`
/// being predicted at `floor(H / 2^l) × floor(W / 2^l)`.
#[derive(Module, Debug)]
pub struct PlaneModel<B: Backend> {
    pub offsets: Param<Tensor<B, 1>>,
}

impl<B: Backend> PlaneModel<B> {
    pub fn new(levels: usize, device: &B::Device) -> Self {
        Self {
            offsets: Param::from_tensor(Tensor::zeros([levels], device)),
        }
    }

    pub fn offset_values(&self) -> Vec<f32> {
        self.offsets.val().into_data().convert::<f32>().to_vec().unwrap()
    }
}

impl<B: Backend> DepthModel<B> for PlaneModel<B> {
    fn forward(
        &self,
        images: Tensor<B, 5>,
        _projections: Tensor<B, 4>,
        depth_values: Tensor<B, 2>,
    ) -> DepthOutput<B> {
        let [n, _, _, height, width] = images.dims();
        let levels = self.offsets.dims()[0];
        let base = depth_values.mean_dim(1).reshape([n, 1, 1]);
        let offsets = self.offsets.val();

        let depth = (0..levels)
            .map(|l| {
                let (h, w) = (height >> l, width >> l);
                let offset = offsets
                    .clone()
                    .slice([l..l + 1])
                    .reshape([1, 1, 1])
                    .expand([n, 1, 1]);
                (base.clone() + offset).expand([n, h, w])
            })
            .collect();

        DepthOutput {
            depth,
            photometric_confidence: Tensor::ones([n, height, width], &images.device()),
            refined_depth: None,
        }
    }
}

pub fn adam(
    config: &TrainingConfig,
) -> impl Optimizer<PlaneModel<TestAutodiffBackend>, TestAutodiffBackend> {
    build_adam::<TestAutodiffBackend, PlaneModel<TestAutodiffBackend>>(config)
}

pub fn inner_model(model: &PlaneModel<TestAutodiffBackend>) -> PlaneModel<TestBackend> {
    model.valid()
}

/// In-memory sample source.
pub struct VecSource(pub Vec<Sample>);

impl SampleSource for VecSource {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn sample(&self, index: usize) -> mvs_io::Result<Sample> {
        self.0.get(index).cloned().ok_or(MvsIoError::IndexOutOfRange {
            index,
            len: self.0.len(),
        })
    }
}

/// Three-view sample with flat images, hypotheses from `DEPTH_MIN` and the
/// given `width × height` ground truth.
pub fn sample_with_depth(
    width: usize,
    height: usize,
    depth: Vec<f32>,
    depth_interval: f32,
    name: &str,
) -> Sample {
    let views = 3;
    let depth = DepthMap::from_vec(width, height, depth).unwrap();
    let camera =
        CameraParams::new(Matrix3::identity(), Matrix4::identity(), DEPTH_MIN, depth_interval)
            .unwrap();
    let hypotheses =
        generate_hypotheses(DEPTH_MIN, depth_interval, NDEPTHS, DepthMode::Linear).unwrap();
    let mask = DepthBand::new(DEPTH_MIN, depth_interval, NDEPTHS).mask(&depth);

    Sample {
        images: vec![
            ImageChw {
                width,
                height,
                data: vec![0.5; 3 * width * height],
            };
            views
        ],
        projections: vec![camera.projection(); views],
        hypotheses,
        depth,
        mask,
        depth_min: DEPTH_MIN,
        depth_interval,
        name: PathBuf::from(name),
    }
}

/// Square sample with constant ground truth.
pub fn flat_sample(size: usize, depth: f32, view: usize) -> Sample {
    sample_with_depth(
        size,
        size,
        vec![depth; size * size],
        1.0,
        &format!("Depths/scan1_train/depth_map_{view:04}.pfm"),
    )
}

/// Source of `count` flat 16×16 samples with depth 20 and a little spread.
pub fn training_source(count: usize) -> VecSource {
    VecSource(
        (0..count)
            .map(|i| flat_sample(16, 20.0 + i as f32 * 0.25, i))
            .collect(),
    )
}

pub fn values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().convert::<f32>().to_vec().unwrap()
}
