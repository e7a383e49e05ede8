//! Pyramid levels and per-level loss weights.

use serde::{Deserialize, Serialize};

/// Resolution pyramid predicted by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pyramid {
    /// Full resolution only.
    Single,
    /// Full, half, quarter and eighth resolution.
    #[default]
    Standard,
}

impl Pyramid {
    /// Scale factor of every level, finest first.
    pub fn scales(self) -> &'static [f32] {
        match self {
            Self::Single => &[1.0],
            Self::Standard => &[1.0, 0.5, 0.25, 0.125],
        }
    }

    /// Number of levels.
    #[inline]
    pub fn levels(self) -> usize {
        self.scales().len()
    }

    /// Output size `(h, w)` of `level` for a `height × width` reference image.
    ///
    /// Returns `None` when `level` is out of range.
    pub fn level_size(self, level: usize, height: usize, width: usize) -> Option<(usize, usize)> {
        let scale = f64::from(*self.scales().get(level)?);
        let h = (height as f64 * scale).floor() as usize;
        let w = (width as f64 * scale).floor() as usize;
        Some((h, w))
    }
}

/// Per-level loss weights, finest level first.
///
/// Presets other than `Uniform` and `Custom` define exactly four weights and
/// therefore require the standard pyramid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum WeightPreset {
    /// 1 at every level, whatever the level count.
    Uniform,
    /// `[1, 0.5, 0.25, 0.125]`
    Halving,
    /// `[1, 0.25, 0.0625, 0.031]`
    Quartering,
    /// `[0.8, 0.2, 0.05, 0.025]`
    Balanced,
    /// `[0.32, 0.08, 0.02, 0.01]`
    #[default]
    FrontLoaded,
    /// `[0.48, 0.08, 0.02, 0.01]`
    FrontLoadedHeavy,
    /// `[0.32, 0.16, 0.04, 0.01]`
    FrontLoadedMid,
    /// `[0.48, 0.16, 0.04, 0.01]`
    FrontLoadedHeavyMid,
    /// `[1, 0, 0, 0]`
    FullOnly,
    /// `[0, 0, 0, 1]`
    CoarseOnly,
    /// Explicit weights.
    Custom(Vec<f32>),
}

impl WeightPreset {
    /// Preset for a legacy numeric loss-weighting code.
    ///
    /// Codes: 1 Halving, 2 Quartering, 3 Balanced, 4 FrontLoaded, 401
    /// FrontLoadedHeavy, 41 FrontLoadedMid, 42 FrontLoadedHeavyMid, 5 FullOnly,
    /// 6 Uniform.
    pub fn from_code(code: u32) -> Option<Self> {
        let preset = match code {
            1 => Self::Halving,
            2 => Self::Quartering,
            3 => Self::Balanced,
            4 => Self::FrontLoaded,
            401 => Self::FrontLoadedHeavy,
            41 => Self::FrontLoadedMid,
            42 => Self::FrontLoadedHeavyMid,
            5 => Self::FullOnly,
            6 => Self::Uniform,
            _ => return None,
        };
        Some(preset)
    }

    /// Weights for a pyramid of `levels` levels.
    pub fn weights(&self, levels: usize) -> Result<Vec<f32>, String> {
        let weights = match self {
            Self::Uniform => return Ok(vec![1.0; levels]),
            Self::Halving => vec![1.0, 0.5, 0.25, 0.125],
            Self::Quartering => vec![1.0, 0.25, 0.0625, 0.031],
            Self::Balanced => vec![0.8, 0.2, 0.05, 0.025],
            Self::FrontLoaded => vec![0.32, 0.08, 0.02, 0.01],
            Self::FrontLoadedHeavy => vec![0.48, 0.08, 0.02, 0.01],
            Self::FrontLoadedMid => vec![0.32, 0.16, 0.04, 0.01],
            Self::FrontLoadedHeavyMid => vec![0.48, 0.16, 0.04, 0.01],
            Self::FullOnly => vec![1.0, 0.0, 0.0, 0.0],
            Self::CoarseOnly => vec![0.0, 0.0, 0.0, 1.0],
            Self::Custom(w) => w.clone(),
        };

        if weights.len() != levels {
            return Err(format!(
                "{:?} defines {} weights but the pyramid has {} levels",
                self,
                weights.len(),
                levels
            ));
        }
        if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(format!("weights must be non-negative, got {weights:?}"));
        }
        Ok(weights)
    }
}

/// How the refinement head output enters the total loss.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RefineWeighting {
    /// Refined output is not supervised.
    #[default]
    Ignore,
    /// `rw · initial + refined`
    ScaleInitial(f32),
    /// `initial + rw · refined`
    ScaleRefined(f32),
}
