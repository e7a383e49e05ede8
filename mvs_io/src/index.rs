//! Scan index: every (scan, lighting, reference view) training unit.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_error, MvsIoError, Result};
use crate::pair::ViewPair;

/// Which lighting conditions to index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightingSelector {
    /// One fixed lighting condition.
    Fixed(u32),
    /// Every condition in `0..num_lightings`.
    #[default]
    All,
}

/// One training unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewMeta {
    /// Scan identifier.
    pub scan: String,
    /// Lighting condition index.
    pub lighting: u32,
    /// Reference view id.
    pub ref_view: u32,
    /// Ranked neighbor ids from the pair table.
    pub neighbors: Vec<u32>,
}

/// Ordered list of [`ViewMeta`], scan order × viewpoint order × lighting order.
#[derive(Debug, Clone, Default)]
pub struct ScanIndex {
    metas: Vec<ViewMeta>,
}

impl ScanIndex {
    /// Expand scans, view pairs and lighting into the index.
    ///
    /// # Errors
    /// [`MvsIoError::InvalidConfig`] if a fixed lighting is not below
    /// `num_lightings` or `num_lightings` is zero with [`LightingSelector::All`].
    pub fn build(
        scans: &[String],
        view_pairs: &[ViewPair],
        lighting: LightingSelector,
        num_lightings: u32,
    ) -> Result<Self> {
        let lightings: Vec<u32> = match lighting {
            LightingSelector::Fixed(light) if light < num_lightings => vec![light],
            LightingSelector::Fixed(light) => {
                return Err(MvsIoError::config(format!(
                    "lighting {light} out of range for {num_lightings} conditions"
                )))
            }
            LightingSelector::All if num_lightings == 0 => {
                return Err(MvsIoError::config("num_lightings must be positive"))
            }
            LightingSelector::All => (0..num_lightings).collect(),
        };

        let mut metas = Vec::with_capacity(scans.len() * view_pairs.len() * lightings.len());
        for scan in scans {
            for pair in view_pairs {
                for &light in &lightings {
                    metas.push(ViewMeta {
                        scan: scan.clone(),
                        lighting: light,
                        ref_view: pair.ref_view,
                        neighbors: pair.neighbors.clone(),
                    });
                }
            }
        }

        Ok(Self { metas })
    }

    /// Number of training units.
    #[inline]
    pub fn len(&self) -> usize {
        self.metas.len()
    }

    /// Whether the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    /// Unit at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ViewMeta> {
        self.metas.get(index)
    }

    /// All units in order.
    pub fn metas(&self) -> &[ViewMeta] {
        &self.metas
    }
}

/// Read a scan list: one scan id per non-empty line.
pub fn read_scan_list(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}
