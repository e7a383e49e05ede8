//! Per-view calibration and the fused projection operator.

use nalgebra::{Matrix3, Matrix4};

use crate::error::{MvsCoreError, Result};

/// Calibration of one view.
///
/// `depth_interval` is already multiplied by the configured interval scale.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraParams {
    /// Intrinsic matrix K.
    pub intrinsics: Matrix3<f32>,
    /// Extrinsic pose, world to camera.
    pub extrinsics: Matrix4<f32>,
    /// Smallest depth covered by the hypothesis set.
    pub depth_min: f32,
    /// Spacing between consecutive linear hypotheses.
    pub depth_interval: f32,
}

impl CameraParams {
    /// Create calibration, rejecting a non-positive or non-finite interval.
    pub fn new(
        intrinsics: Matrix3<f32>,
        extrinsics: Matrix4<f32>,
        depth_min: f32,
        depth_interval: f32,
    ) -> Result<Self> {
        if !(depth_interval.is_finite() && depth_interval > 0.0) {
            return Err(MvsCoreError::InvalidInterval {
                value: depth_interval,
            });
        }
        Ok(Self {
            intrinsics,
            extrinsics,
            depth_min,
            depth_interval,
        })
    }

    /// Fuse intrinsics and extrinsics into the projection operator.
    #[inline]
    pub fn projection(&self) -> ProjectionOperator {
        ProjectionOperator::from_calibration(&self.intrinsics, &self.extrinsics)
    }
}

/// World→pixel+depth transform: the extrinsic pose with its upper 3×4 block
/// replaced by `K · E[:3, :4]`. The bottom row is the extrinsic bottom row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionOperator(Matrix4<f32>);

impl ProjectionOperator {
    /// Build the operator from intrinsics and extrinsics.
    pub fn from_calibration(intrinsics: &Matrix3<f32>, extrinsics: &Matrix4<f32>) -> Self {
        let mut fused = *extrinsics;
        let top = intrinsics * extrinsics.fixed_view::<3, 4>(0, 0);
        fused.fixed_view_mut::<3, 4>(0, 0).copy_from(&top);
        Self(fused)
    }

    /// The underlying 4×4 matrix.
    #[inline]
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.0
    }

    /// Row-major copy, the layout tensors are built from.
    pub fn to_row_major(&self) -> [f32; 16] {
        let mut out = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = self.0[(row, col)];
            }
        }
        out
    }
}
