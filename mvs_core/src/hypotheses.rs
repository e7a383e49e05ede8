//! Depth hypothesis generation.
//!
//! Hypotheses cover `[depth_min, depth_min + ndepths · depth_interval)` and are
//! strictly increasing in both modes:
//!
//! - **Linear**: arithmetic progression with step `depth_interval`
//! - **Inverse**: evenly spaced in reciprocal depth, so spacing grows with
//!   distance and more planes sit near the camera

use serde::{Deserialize, Serialize};

use crate::error::{MvsCoreError, Result};

/// Spacing of the hypothesis planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthMode {
    /// `depth_min + k · depth_interval`.
    #[default]
    Linear,
    /// Reciprocal-linear over `[1/depth_min, 1/depth_end)`.
    Inverse,
}

/// Ordered set of candidate depths for the reference view.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthHypotheses {
    values: Vec<f32>,
    mode: DepthMode,
}

impl DepthHypotheses {
    /// Number of hypotheses.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty (never true for generated sets).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The spacing mode used to build the set.
    #[inline]
    pub fn mode(&self) -> DepthMode {
        self.mode
    }

    /// Hypothesis values, nearest first.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Nearest hypothesis.
    pub fn first(&self) -> Option<f32> {
        self.values.first().copied()
    }

    /// Farthest hypothesis.
    pub fn last(&self) -> Option<f32> {
        self.values.last().copied()
    }

    /// Consume into the raw values.
    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }
}

/// Generate `ndepths` hypotheses starting at `depth_min`.
///
/// Values are computed in `f64` and stored as `f32`, so the count is exact
/// regardless of floating point accumulation.
///
/// # Errors
/// [`MvsCoreError::InvalidConfig`] when `ndepths == 0`, the interval is not a
/// positive finite number, or inverse mode is requested with `depth_min <= 0`.
pub fn generate_hypotheses(
    depth_min: f32,
    depth_interval: f32,
    ndepths: usize,
    mode: DepthMode,
) -> Result<DepthHypotheses> {
    if ndepths == 0 {
        return Err(MvsCoreError::config("ndepths must be positive"));
    }
    if !(depth_interval.is_finite() && depth_interval > 0.0) {
        return Err(MvsCoreError::config(format!(
            "depth_interval must be positive and finite, got {depth_interval}"
        )));
    }
    if !depth_min.is_finite() {
        return Err(MvsCoreError::config("depth_min must be finite"));
    }

    let start = depth_min as f64;
    let step = depth_interval as f64;

    let values = match mode {
        DepthMode::Linear => (0..ndepths)
            .map(|k| (start + k as f64 * step) as f32)
            .collect(),
        DepthMode::Inverse => {
            if depth_min <= 0.0 {
                return Err(MvsCoreError::config(format!(
                    "inverse depth spacing needs depth_min > 0, got {depth_min}"
                )));
            }
            let depth_end = start + ndepths as f64 * step;
            let inv_start = 1.0 / start;
            let inv_step = (1.0 / depth_end - inv_start) / ndepths as f64;
            (0..ndepths)
                .map(|k| (1.0 / (inv_start + k as f64 * inv_step)) as f32)
                .collect()
        }
    };

    Ok(DepthHypotheses { values, mode })
}
