//! Prediction export and offline re-scoring.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use burn::prelude::*;

use mvs_core::DepthMap;
use mvs_io::{read_pfm, write_pfm, SampleSource};

use crate::config::SupervisionConfig;
use crate::data::{BatchLoader, MvsBatch};
use crate::error::{NeuralMvsError, Result};
use crate::model::DepthOutput;
use crate::supervision::{MultiScaleSupervision, Pyramid, RefineWeighting, WeightPreset};

use super::metrics::RunningMean;

/// Writes predicted depth and confidence maps as PFM files.
///
/// A sample named `.../<scan dir>/<file>` is saved as
/// `save_dir/<scan dir>/init_<file>` (depth) and `prob_<file>` (confidence).
#[derive(Debug, Clone)]
pub struct PredictionWriter {
    save_dir: PathBuf,
}

impl PredictionWriter {
    /// Writer rooted at `save_dir`.
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    /// Root directory.
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Depth and confidence paths for a sample name.
    pub fn prediction_paths(&self, name: &Path) -> (PathBuf, PathBuf) {
        let dir = match name.parent().and_then(Path::file_name) {
            Some(scan_dir) => self.save_dir.join(scan_dir),
            None => self.save_dir.clone(),
        };
        let file = name
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        (
            dir.join(format!("init_{file}")),
            dir.join(format!("prob_{file}")),
        )
    }

    /// Save `[N, h, w]` depth and confidence maps, one pair per name.
    pub fn write<B: Backend>(
        &self,
        depth: Tensor<B, 3>,
        confidence: Tensor<B, 3>,
        names: &[PathBuf],
    ) -> Result<()> {
        let depth_maps = split_maps(depth, names.len())?;
        let confidence_maps = split_maps(confidence, names.len())?;

        for ((name, depth), confidence) in names.iter().zip(depth_maps).zip(confidence_maps) {
            let (depth_path, prob_path) = self.prediction_paths(name);
            if let Some(dir) = depth_path.parent() {
                fs::create_dir_all(dir).map_err(|source| NeuralMvsError::Filesystem {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            write_pfm(&depth_path, &depth)?;
            write_pfm(&prob_path, &confidence)?;
            log::debug!("Saved prediction {}", depth_path.display());
        }
        Ok(())
    }
}

/// Split a `[N, h, w]` tensor into `n` depth maps.
fn split_maps<B: Backend>(maps: Tensor<B, 3>, n: usize) -> Result<Vec<DepthMap>> {
    let [count, h, w] = maps.dims();
    if count != n {
        return Err(NeuralMvsError::ShapeMismatch {
            expected: vec![n, h, w],
            got: vec![count, h, w],
        });
    }

    let values: Vec<f32> = maps
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|err| NeuralMvsError::InvalidData(format!("{err:?}")))?;

    values
        .chunks(h * w)
        .map(|chunk| Ok(DepthMap::from_vec(w, h, chunk.to_vec())?))
        .collect()
}

/// Re-score depth predictions saved earlier by a [`PredictionWriter`].
///
/// Every sample of `source` is scored at full resolution with `config`'s loss
/// and thresholds. Pyramid, weights and refinement are forced to a single
/// level.
pub fn evaluate_saved_predictions<B, S>(
    writer: &PredictionWriter,
    source: &S,
    config: SupervisionConfig,
    device: &B::Device,
) -> Result<BTreeMap<String, f32>>
where
    B: Backend,
    S: SampleSource + ?Sized,
{
    let config = config
        .with_pyramid(Pyramid::Single)
        .with_weights(WeightPreset::Uniform)
        .with_refine(RefineWeighting::Ignore);
    let engine = MultiScaleSupervision::<B>::new(config)?;

    let loader = BatchLoader::new(source, 1);
    let mut running = RunningMean::new();

    for samples in loader.batches(0) {
        let samples = samples?;
        let Some(sample) = samples.first() else {
            continue;
        };

        let (depth_path, _) = writer.prediction_paths(&sample.name);
        let prediction = read_pfm(&depth_path)?;
        let (h, w) = (prediction.height(), prediction.width());
        let prediction = Tensor::<B, 3>::from_data(
            TensorData::new(prediction.into_vec(), [1, h, w]),
            device,
        );

        let batch = MvsBatch::<B>::from_samples(&samples, device)?;
        let output = DepthOutput {
            depth: vec![prediction.clone()],
            photometric_confidence: prediction.ones_like(),
            refined_depth: None,
        };
        running.update(&engine.score(&output, &batch)?.to_scalars())?;
    }

    running.log("saved predictions");
    Ok(running.mean())
}
