//! Multi-scale depth supervision.
//!
//! The model predicts depth at every level of a [`Pyramid`]. Each prediction
//! is compared with the ground truth resampled to its resolution, under a
//! mask rebuilt from the resampled depth, and the per-level losses are
//! combined with a [`WeightPreset`].
//!
//! ```ignore
//! let engine = MultiScaleSupervision::<B>::new(SupervisionConfig::new())?;
//! let report = engine.score(&model.forward(images, projections, depth_values), &batch)?;
//! report.loss.backward();
//! ```

mod engine;
mod pyramid;

pub use engine::{
    resample_depth, LevelMetrics, LevelScore, MultiScaleSupervision, SupervisionReport,
};
pub use pyramid::{Pyramid, RefineWeighting, WeightPreset};
