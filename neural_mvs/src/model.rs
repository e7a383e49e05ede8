//! Interface to the depth network.
//!
//! The network itself is an external collaborator: the training loop only
//! needs its forward pass and the burn [`Module`] machinery for parameters,
//! records and autodiff.

use burn::prelude::*;

/// Outputs of one forward pass.
#[derive(Debug, Clone)]
pub struct DepthOutput<B: Backend> {
    /// Depth per pyramid level, finest first, each `[N, h_l, w_l]`.
    pub depth: Vec<Tensor<B, 3>>,
    /// Per-pixel confidence of the finest estimate, `[N, h_0, w_0]`.
    pub photometric_confidence: Tensor<B, 3>,
    /// Optional output of a refinement head, `[N, h, w]`.
    pub refined_depth: Option<Tensor<B, 3>>,
}

/// A depth network trained against multi-view samples.
pub trait DepthModel<B: Backend>: Module<B> {
    /// Estimate reference-view depth.
    ///
    /// - `images`: `[N, V, 3, H, W]`, reference view first
    /// - `projections`: `[N, V, 4, 4]`, row-major projection operators
    /// - `depth_values`: `[N, D]`, depth hypotheses of the reference view
    fn forward(
        &self,
        images: Tensor<B, 5>,
        projections: Tensor<B, 4>,
        depth_values: Tensor<B, 2>,
    ) -> DepthOutput<B>;
}
