//! Dataset directory layouts.

use std::path::{Path, PathBuf};

/// Maps (scan, view, lighting) to the files of one dataset.
pub trait DatasetLayout: Send + Sync {
    /// Image of `view` in `scan` under `lighting`.
    fn image_path(&self, scan: &str, view: u32, lighting: u32) -> PathBuf;

    /// Ground-truth depth of `view` in `scan`.
    fn depth_path(&self, scan: &str, view: u32) -> PathBuf;

    /// Calibration of `view` in `scan`.
    fn camera_path(&self, scan: &str, view: u32) -> PathBuf;

    /// The view-pair table.
    fn pair_path(&self) -> PathBuf;
}

/// Rectified DTU training layout.
///
/// ```text
/// Rectified/{scan}_train/rect_{view+1:03}_{light}_r5000.png
/// Depths/{scan}_train/depth_map_{view:04}.pfm
/// Cameras/train/{view:08}_cam.txt
/// Cameras/pair.txt
/// ```
///
/// Image file ids are one-based; all other ids are zero-based. Cameras are
/// shared across scans.
#[derive(Debug, Clone)]
pub struct DtuLayout {
    root: PathBuf,
}

impl DtuLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Dataset root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DatasetLayout for DtuLayout {
    fn image_path(&self, scan: &str, view: u32, lighting: u32) -> PathBuf {
        self.root
            .join("Rectified")
            .join(format!("{scan}_train"))
            .join(format!("rect_{:03}_{}_r5000.png", view + 1, lighting))
    }

    fn depth_path(&self, scan: &str, view: u32) -> PathBuf {
        self.root
            .join("Depths")
            .join(format!("{scan}_train"))
            .join(format!("depth_map_{view:04}.pfm"))
    }

    fn camera_path(&self, _scan: &str, view: u32) -> PathBuf {
        self.root
            .join("Cameras")
            .join("train")
            .join(format!("{view:08}_cam.txt"))
    }

    fn pair_path(&self) -> PathBuf {
        self.root.join("Cameras").join("pair.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtu_paths() {
        let layout = DtuLayout::new("/data/dtu");
        assert_eq!(
            layout.image_path("scan1", 0, 3),
            PathBuf::from("/data/dtu/Rectified/scan1_train/rect_001_3_r5000.png")
        );
        assert_eq!(
            layout.depth_path("scan1", 12),
            PathBuf::from("/data/dtu/Depths/scan1_train/depth_map_0012.pfm")
        );
        assert_eq!(
            layout.camera_path("scan1", 12),
            PathBuf::from("/data/dtu/Cameras/train/00000012_cam.txt")
        );
        assert_eq!(layout.pair_path(), PathBuf::from("/data/dtu/Cameras/pair.txt"));
    }
}
