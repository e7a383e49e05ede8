//! Sample assembly.
//!
//! A sample is rebuilt from disk on every access. Batches are assembled in
//! parallel when the `rayon` feature is enabled; each worker opens its own
//! files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mvs_core::{
    generate_hypotheses, DepthBand, DepthHypotheses, DepthMap, ProjectionOperator, ValidityMask,
};

use crate::camera::load_camera;
use crate::config::DatasetConfig;
use crate::error::{MvsIoError, Result};
use crate::image::{load_image, ImageChw};
use crate::index::{read_scan_list, ScanIndex, ViewMeta};
use crate::layout::{DatasetLayout, DtuLayout};
use crate::pair::read_view_pairs;
use crate::pfm::read_pfm;

/// What to do with a reference view that lists too few neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InsufficientViewsPolicy {
    /// Abort the batch.
    #[default]
    Fail,
    /// Drop the sample with a warning.
    Skip,
}

/// Everything one training step needs for a reference view.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Images, reference first.
    pub images: Vec<ImageChw>,
    /// Projection operators, same order as `images`.
    pub projections: Vec<ProjectionOperator>,
    /// Reference-view depth hypotheses.
    pub hypotheses: DepthHypotheses,
    /// Reference-view ground-truth depth.
    pub depth: DepthMap,
    /// Supervision mask over `depth`.
    pub mask: ValidityMask,
    /// Reference-view minimum depth.
    pub depth_min: f32,
    /// Reference-view scaled depth interval.
    pub depth_interval: f32,
    /// Ground-truth depth path, used to name exported predictions.
    pub name: PathBuf,
}

impl Sample {
    /// Number of views.
    #[inline]
    pub fn view_count(&self) -> usize {
        self.images.len()
    }

    /// Image size as `(height, width)`.
    pub fn image_size(&self) -> (usize, usize) {
        self.images
            .first()
            .map(|img| (img.height, img.width))
            .unwrap_or((0, 0))
    }

    /// Supervised depth band of this sample.
    pub fn band(&self) -> DepthBand {
        DepthBand::new(self.depth_min, self.depth_interval, self.hypotheses.len())
    }
}

/// Indexed collection of samples.
pub trait SampleSource: Sync {
    /// Number of samples.
    fn len(&self) -> usize;

    /// Whether there are no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build sample `index`.
    fn sample(&self, index: usize) -> Result<Sample>;

    /// Build several samples, preserving the order of `indices`.
    ///
    /// With [`InsufficientViewsPolicy::Skip`], samples failing with
    /// [`MvsIoError::InsufficientViews`] are dropped. Every other error aborts
    /// the batch; when several samples fail, the first in `indices` order is
    /// returned.
    fn assemble_batch(
        &self,
        indices: &[usize],
        policy: InsufficientViewsPolicy,
    ) -> Result<Vec<Sample>> {
        let assemble_one = |&index: &usize| -> Result<Option<Sample>> {
            match self.sample(index) {
                Ok(sample) => Ok(Some(sample)),
                Err(err)
                    if err.is_insufficient_views() && policy == InsufficientViewsPolicy::Skip =>
                {
                    log::warn!("Skipping sample {}: {}", index, err);
                    Ok(None)
                }
                Err(err) => Err(err),
            }
        };

        #[cfg(feature = "rayon")]
        let results: Vec<Result<Option<Sample>>> = {
            use rayon::prelude::*;
            indices.par_iter().map(assemble_one).collect()
        };
        #[cfg(not(feature = "rayon"))]
        let results: Vec<Result<Option<Sample>>> = indices.iter().map(assemble_one).collect();

        results.into_iter().filter_map(Result::transpose).collect()
    }
}

/// Multi-view stereo dataset over a directory layout.
#[derive(Debug)]
pub struct MvsDataset<L: DatasetLayout = DtuLayout> {
    layout: L,
    index: ScanIndex,
    config: DatasetConfig,
}

impl MvsDataset<DtuLayout> {
    /// Open a DTU-layout dataset from its root and a scan list file.
    pub fn open_dtu(root: &Path, scan_list: &Path, config: DatasetConfig) -> Result<Self> {
        let scans = read_scan_list(scan_list)?;
        Self::open(DtuLayout::new(root), &scans, config)
    }
}

impl<L: DatasetLayout> MvsDataset<L> {
    /// Index `scans` with the layout's pair table.
    pub fn open(layout: L, scans: &[String], config: DatasetConfig) -> Result<Self> {
        config.validate().map_err(MvsIoError::config)?;
        let pairs = read_view_pairs(&layout.pair_path())?;
        let index = ScanIndex::build(scans, &pairs, config.lighting, config.num_lightings)?;

        log::info!(
            "Indexed {} samples ({} scans, {} viewpoints, {:?})",
            index.len(),
            scans.len(),
            pairs.len(),
            config.lighting
        );

        Ok(Self {
            layout,
            index,
            config,
        })
    }

    /// Dataset over a prebuilt index.
    pub fn with_index(layout: L, index: ScanIndex, config: DatasetConfig) -> Result<Self> {
        config.validate().map_err(MvsIoError::config)?;
        Ok(Self {
            layout,
            index,
            config,
        })
    }

    /// Dataset configuration.
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Directory layout.
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Training unit at `index`.
    pub fn meta(&self, index: usize) -> Option<&ViewMeta> {
        self.index.get(index)
    }

    /// The full index.
    pub fn index(&self) -> &ScanIndex {
        &self.index
    }

    /// Assemble the sample for one training unit.
    ///
    /// Views are the reference followed by the first `view_count - 1`
    /// neighbors. Only the reference view contributes hypotheses, depth and
    /// mask.
    pub fn assemble(&self, meta: &ViewMeta) -> Result<Sample> {
        let required = self.config.view_count - 1;
        if meta.neighbors.len() < required {
            return Err(MvsIoError::InsufficientViews {
                scan: meta.scan.clone(),
                ref_view: meta.ref_view,
                available: meta.neighbors.len(),
                required,
            });
        }

        let scale = self.config.interval_scale;
        let scan = meta.scan.as_str();

        let reference = load_camera(&self.layout.camera_path(scan, meta.ref_view), scale)?;
        let hypotheses = generate_hypotheses(
            reference.depth_min,
            reference.depth_interval,
            self.config.ndepths,
            self.config.depth_mode,
        )?;

        let name = self.layout.depth_path(scan, meta.ref_view);
        let depth = read_pfm(&name)?;
        let band = DepthBand::new(reference.depth_min, reference.depth_interval, hypotheses.len());
        let mask = band.mask(&depth);

        let mut images = Vec::with_capacity(self.config.view_count);
        let mut projections = Vec::with_capacity(self.config.view_count);

        images.push(load_image(
            &self.layout.image_path(scan, meta.ref_view, meta.lighting),
        )?);
        projections.push(reference.projection());

        for &view in &meta.neighbors[..required] {
            let image = load_image(&self.layout.image_path(scan, view, meta.lighting))?;
            if image.shape() != images[0].shape() {
                return Err(MvsIoError::ShapeMismatch {
                    expected: images[0].shape().to_vec(),
                    got: image.shape().to_vec(),
                });
            }
            let camera = load_camera(&self.layout.camera_path(scan, view), scale)?;
            images.push(image);
            projections.push(camera.projection());
        }

        log::debug!(
            "Assembled {} ({} views, {} valid pixels)",
            name.display(),
            images.len(),
            mask.valid_count()
        );

        Ok(Sample {
            images,
            projections,
            hypotheses,
            depth,
            mask,
            depth_min: reference.depth_min,
            depth_interval: reference.depth_interval,
            name,
        })
    }
}

impl<L: DatasetLayout> SampleSource for MvsDataset<L> {
    fn len(&self) -> usize {
        self.index.len()
    }

    fn sample(&self, index: usize) -> Result<Sample> {
        let meta = self.index.get(index).ok_or(MvsIoError::IndexOutOfRange {
            index,
            len: self.index.len(),
        })?;
        self.assemble(meta)
    }
}
