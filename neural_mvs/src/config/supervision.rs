//! Supervision configuration.

use burn::config::Config;

use crate::loss::RegressionLoss;
use crate::supervision::{Pyramid, RefineWeighting, WeightPreset};

/// Configuration for the multi-scale supervision engine.
#[derive(Config, Debug)]
pub struct SupervisionConfig {
    /// Per-pixel regression penalty.
    #[config(default = "RegressionLoss::SmoothL1")]
    pub loss: RegressionLoss,

    /// Divide the depth error by each sample's depth interval before the
    /// penalty.
    #[config(default = false)]
    pub normalize_by_interval: bool,

    /// Per-level loss weights.
    #[config(default = "WeightPreset::FrontLoaded")]
    pub weights: WeightPreset,

    /// Pyramid the model predicts.
    #[config(default = "Pyramid::Standard")]
    pub pyramid: Pyramid,

    /// Absolute-error thresholds for the accuracy metrics, in depth units.
    #[config(default = "vec![2.0, 4.0, 8.0]")]
    pub thresholds: Vec<f32>,

    /// How a refinement head output enters the loss.
    #[config(default = "RefineWeighting::Ignore")]
    pub refine: RefineWeighting,
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisionConfig {
    /// Single-scale supervision with the plain masked loss.
    pub fn single_scale() -> Self {
        Self::new()
            .with_pyramid(Pyramid::Single)
            .with_weights(WeightPreset::Uniform)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.weights.weights(self.pyramid.levels())?;

        if self.thresholds.iter().any(|t| !(t.is_finite() && *t > 0.0)) {
            return Err("thresholds must be positive".to_string());
        }
        match self.refine {
            RefineWeighting::ScaleInitial(w) | RefineWeighting::ScaleRefined(w)
                if !(w.is_finite() && w >= 0.0) =>
            {
                Err(format!("refine weight must be non-negative, got {w}"))
            }
            _ => Ok(()),
        }
    }
}
