//! Per-pixel regression penalties and masked reduction.
//!
//! Every penalty maps a signed depth error to a non-negative per-pixel cost.
//! [`masked_mean`] averages a cost map over the supervised pixels only.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

/// Penalty applied to the per-pixel depth error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegressionLoss {
    /// `|x|`
    Absolute,
    /// `x^2`
    Squared,
    /// Huber with unit threshold: `0.5 x^2` when `|x| < 1`, else `|x| - 0.5`.
    #[default]
    SmoothL1,
}

/// Elementwise penalty over a `[N, H, W]` error map.
pub type PenaltyFn<B> = fn(Tensor<B, 3>) -> Tensor<B, 3>;

impl RegressionLoss {
    /// Penalty function for this loss on backend `B`.
    pub fn resolve<B: Backend>(self) -> PenaltyFn<B> {
        match self {
            Self::Absolute => absolute::<B>,
            Self::Squared => squared::<B>,
            Self::SmoothL1 => smooth_l1::<B>,
        }
    }
}

/// Absolute error.
pub fn absolute<B: Backend>(error: Tensor<B, 3>) -> Tensor<B, 3> {
    error.abs()
}

/// Squared error.
pub fn squared<B: Backend>(error: Tensor<B, 3>) -> Tensor<B, 3> {
    error.clone() * error
}

/// Smooth L1 error with unit threshold.
pub fn smooth_l1<B: Backend>(error: Tensor<B, 3>) -> Tensor<B, 3> {
    let abs = error.abs();
    // Quadratic part saturates at 1, the rest grows linearly
    let quad = abs.clone().clamp_max(1.0);
    quad.clone() * quad.clone() * 0.5 + (abs - quad)
}

/// Mean of `values` over pixels where `mask` is 1.
///
/// `mask` is a float map of zeros and ones with the shape of `values`. An
/// empty mask yields zero rather than NaN.
pub fn masked_mean<B: Backend>(values: Tensor<B, 3>, mask: Tensor<B, 3>) -> Tensor<B, 1> {
    let count = mask.clone().sum().clamp_min(1.0);
    (values * mask).sum() / count
}
