//! Batches of samples materialized on a device.

use std::path::PathBuf;

use burn::prelude::*;

use mvs_io::Sample;

use crate::error::{NeuralMvsError, Result};

/// A batch of samples as tensors.
#[derive(Debug, Clone)]
pub struct MvsBatch<B: Backend> {
    /// Images `[N, V, 3, H, W]`, reference view first.
    pub images: Tensor<B, 5>,
    /// Row-major projection operators `[N, V, 4, 4]`.
    pub projections: Tensor<B, 4>,
    /// Depth hypotheses `[N, D]`.
    pub depth_values: Tensor<B, 2>,
    /// Ground-truth reference depth `[N, H, W]`.
    pub depth: Tensor<B, 3>,
    /// Full-resolution supervision mask `[N, H, W]` as 0/1.
    pub mask: Tensor<B, 3>,
    /// Per-sample minimum depth `[N]`.
    pub depth_min: Tensor<B, 1>,
    /// Per-sample depth interval `[N]`.
    pub depth_interval: Tensor<B, 1>,
    /// Per-sample exclusive lower band bound `[N]`.
    pub band_lower: Tensor<B, 1>,
    /// Per-sample exclusive upper band bound `[N]`.
    pub band_upper: Tensor<B, 1>,
    /// Sample names, in batch order.
    pub names: Vec<PathBuf>,
}

impl<B: Backend> MvsBatch<B> {
    /// Stack samples into tensors on `device`.
    ///
    /// Every sample must have the same view count, image size and number of
    /// hypotheses.
    pub fn from_samples(samples: &[Sample], device: &B::Device) -> Result<Self> {
        let first = samples
            .first()
            .ok_or_else(|| NeuralMvsError::InvalidData("cannot build an empty batch".into()))?;

        let n = samples.len();
        let views = first.view_count();
        let (height, width) = first.image_size();
        let ndepths = first.hypotheses.len();
        let expected = [views, height, width, ndepths];

        let plane = height * width;
        let mut images = Vec::with_capacity(n * views * 3 * plane);
        let mut projections = Vec::with_capacity(n * views * 16);
        let mut depth_values = Vec::with_capacity(n * ndepths);
        let mut depth = Vec::with_capacity(n * plane);
        let mut mask = Vec::with_capacity(n * plane);
        let mut depth_min = Vec::with_capacity(n);
        let mut depth_interval = Vec::with_capacity(n);
        let mut band_lower = Vec::with_capacity(n);
        let mut band_upper = Vec::with_capacity(n);
        let mut names = Vec::with_capacity(n);

        for sample in samples {
            let (h, w) = sample.image_size();
            let got = [sample.view_count(), h, w, sample.hypotheses.len()];
            let depth_size = [sample.depth.height(), sample.depth.width()];
            if got != expected || depth_size != [height, width] {
                return Err(NeuralMvsError::ShapeMismatch {
                    expected: expected.to_vec(),
                    got: got.to_vec(),
                });
            }

            for image in &sample.images {
                images.extend_from_slice(&image.data);
            }
            for projection in &sample.projections {
                projections.extend_from_slice(&projection.to_row_major());
            }
            depth_values.extend_from_slice(sample.hypotheses.as_slice());
            depth.extend_from_slice(sample.depth.as_slice());
            mask.extend_from_slice(sample.mask.as_slice());

            let band = sample.band();
            depth_min.push(sample.depth_min);
            depth_interval.push(sample.depth_interval);
            band_lower.push(band.lower());
            band_upper.push(band.upper());
            names.push(sample.name.clone());
        }

        Ok(Self {
            images: Tensor::from_data(
                TensorData::new(images, [n, views, 3, height, width]),
                device,
            ),
            projections: Tensor::from_data(TensorData::new(projections, [n, views, 4, 4]), device),
            depth_values: Tensor::from_data(TensorData::new(depth_values, [n, ndepths]), device),
            depth: Tensor::from_data(TensorData::new(depth, [n, height, width]), device),
            mask: Tensor::from_data(TensorData::new(mask, [n, height, width]), device),
            depth_min: Tensor::from_data(TensorData::new(depth_min, [n]), device),
            depth_interval: Tensor::from_data(TensorData::new(depth_interval, [n]), device),
            band_lower: Tensor::from_data(TensorData::new(band_lower, [n]), device),
            band_upper: Tensor::from_data(TensorData::new(band_upper, [n]), device),
            names,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Reference image size `(H, W)`.
    pub fn image_size(&self) -> (usize, usize) {
        let [_, h, w] = self.depth.dims();
        (h, w)
    }
}
