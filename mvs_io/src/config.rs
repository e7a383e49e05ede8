//! Dataset configuration.

use serde::{Deserialize, Serialize};

use mvs_core::DepthMode;

use crate::index::LightingSelector;

/// Configuration for [`crate::MvsDataset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Views per sample: the reference plus `view_count - 1` neighbors.
    pub view_count: usize,
    /// Number of depth hypotheses.
    pub ndepths: usize,
    /// Multiplier applied to the calibration depth interval.
    pub interval_scale: f32,
    /// Hypothesis spacing.
    pub depth_mode: DepthMode,
    /// Lighting conditions to index.
    pub lighting: LightingSelector,
    /// Number of lighting conditions captured per view.
    pub num_lightings: u32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            view_count: 3,
            ndepths: 192,
            interval_scale: 1.06,
            depth_mode: DepthMode::Linear,
            lighting: LightingSelector::All,
            num_lightings: 7,
        }
    }
}

impl DatasetConfig {
    /// Set the number of views per sample.
    pub fn with_view_count(mut self, view_count: usize) -> Self {
        self.view_count = view_count;
        self
    }

    /// Set the number of depth hypotheses.
    pub fn with_ndepths(mut self, ndepths: usize) -> Self {
        self.ndepths = ndepths;
        self
    }

    /// Set the interval scale.
    pub fn with_interval_scale(mut self, interval_scale: f32) -> Self {
        self.interval_scale = interval_scale;
        self
    }

    /// Set the hypothesis spacing.
    pub fn with_depth_mode(mut self, depth_mode: DepthMode) -> Self {
        self.depth_mode = depth_mode;
        self
    }

    /// Set the lighting selector.
    pub fn with_lighting(mut self, lighting: LightingSelector) -> Self {
        self.lighting = lighting;
        self
    }

    /// Set the number of lighting conditions.
    pub fn with_num_lightings(mut self, num_lightings: u32) -> Self {
        self.num_lightings = num_lightings;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.view_count == 0 {
            return Err("view_count must be at least 1".to_string());
        }
        if self.ndepths < 3 {
            return Err(format!("ndepths must be at least 3, got {}", self.ndepths));
        }
        if !(self.interval_scale.is_finite() && self.interval_scale > 0.0) {
            return Err("interval_scale must be positive".to_string());
        }
        if self.num_lightings == 0 {
            return Err("num_lightings must be positive".to_string());
        }
        if let LightingSelector::Fixed(light) = self.lighting {
            if light >= self.num_lightings {
                return Err(format!(
                    "lighting {light} out of range for {} conditions",
                    self.num_lightings
                ));
            }
        }
        Ok(())
    }
}
