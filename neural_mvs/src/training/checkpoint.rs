//! Checkpoint save/load for training resumption.
//!
//! A checkpoint is a directory `model_{epoch:06}` holding the model record,
//! the optimizer record and a metadata file. Metadata is written last, so a
//! directory without it is an interrupted save and is ignored by discovery.

use std::fs;
use std::path::{Path, PathBuf};

use burn::config::Config;
use burn::module::AutodiffModule;
use burn::optim::Optimizer;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::backend::AutodiffBackend;

use crate::error::{self, NeuralMvsError};

use super::controller::TrainingState;

const MODEL_FILE: &str = "model";
const OPTIMIZER_FILE: &str = "optimizer";
const METADATA_FILE: &str = "metadata.json";
const DIR_PREFIX: &str = "model_";

/// Checkpoint metadata stored as JSON.
#[derive(Config, Debug)]
pub struct CheckpointMetadata {
    /// Last completed epoch.
    pub epoch: usize,
    /// Optimizer steps taken so far.
    #[config(default = 0)]
    pub global_step: usize,
    /// Checkpoint version for compatibility.
    #[config(default = 1)]
    pub version: u32,
}

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

/// Directory of the checkpoint for `epoch` under `base_dir`.
pub fn checkpoint_dir(base_dir: &Path, epoch: usize) -> PathBuf {
    base_dir.join(format!("{DIR_PREFIX}{epoch:06}"))
}

/// Save the model and optimizer of `state` as the checkpoint of its epoch.
///
/// Returns the checkpoint directory.
pub fn save_checkpoint<B, M, O>(
    base_dir: &Path,
    state: &TrainingState<B, M, O>,
) -> error::Result<PathBuf>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    O: Optimizer<M, B>,
{
    let dir = checkpoint_dir(base_dir, state.epoch);
    fs::create_dir_all(&dir).map_err(|source| NeuralMvsError::Filesystem {
        path: dir.clone(),
        source,
    })?;

    let recorder = recorder();
    state.model.clone().save_file(dir.join(MODEL_FILE), &recorder)?;
    Recorder::<B>::record(&recorder, state.optimizer.to_record(), dir.join(OPTIMIZER_FILE))?;

    let metadata = CheckpointMetadata::new(state.epoch).with_global_step(state.global_step);
    let metadata_path = dir.join(METADATA_FILE);
    metadata
        .save(&metadata_path)
        .map_err(|source| NeuralMvsError::Filesystem {
            path: metadata_path,
            source,
        })?;

    log::info!(
        "Saved checkpoint to {:?} (epoch {}, step {})",
        dir,
        state.epoch,
        state.global_step
    );

    Ok(dir)
}

/// Read the metadata of a checkpoint directory.
pub fn load_metadata(dir: &Path) -> error::Result<CheckpointMetadata> {
    let path = dir.join(METADATA_FILE);
    CheckpointMetadata::load(&path).map_err(|err| NeuralMvsError::Checkpoint {
        path,
        message: err.to_string(),
    })
}

/// Restore model and optimizer from a checkpoint directory.
///
/// `model` and `optimizer` provide the structure the records are loaded
/// into. The returned state carries the saved epoch.
pub fn load_checkpoint<B, M, O>(
    dir: &Path,
    model: M,
    optimizer: O,
    device: &B::Device,
) -> error::Result<TrainingState<B, M, O>>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    O: Optimizer<M, B>,
{
    if !checkpoint_exists(dir) {
        return Err(NeuralMvsError::Checkpoint {
            path: dir.to_path_buf(),
            message: "incomplete checkpoint".to_string(),
        });
    }
    let metadata = load_metadata(dir)?;

    let recorder = recorder();
    let model = model.load_file(dir.join(MODEL_FILE), &recorder, device)?;
    let record = Recorder::<B>::load::<O::Record>(&recorder, dir.join(OPTIMIZER_FILE), device)?;
    let optimizer = optimizer.load_record(record);

    log::info!(
        "Loaded checkpoint from {:?} (epoch {}, step {})",
        dir,
        metadata.epoch,
        metadata.global_step
    );

    let mut state = TrainingState::new(model, optimizer);
    state.epoch = metadata.epoch;
    state.global_step = metadata.global_step;
    Ok(state)
}

/// Load only the model weights from a checkpoint directory or model file.
pub fn load_model_weights<B, M>(
    path: &Path,
    model: M,
    device: &B::Device,
) -> error::Result<M>
where
    B: Backend,
    M: Module<B>,
{
    let file = if path.is_dir() {
        path.join(MODEL_FILE)
    } else {
        path.with_extension("")
    };
    let model = model.load_file(file, &recorder(), device)?;
    log::info!("Loaded model weights from {:?}", path);
    Ok(model)
}

/// Check if a complete checkpoint exists at the given path.
pub fn checkpoint_exists(dir: &Path) -> bool {
    dir.join(METADATA_FILE).exists()
        && dir.join(MODEL_FILE).with_extension("mpk").exists()
        && dir.join(OPTIMIZER_FILE).with_extension("mpk").exists()
}

/// Get the complete checkpoint with the highest epoch under `base_dir`.
pub fn find_latest_checkpoint(base_dir: &Path) -> Option<PathBuf> {
    let mut latest: Option<(usize, PathBuf)> = None;

    for entry in fs::read_dir(base_dir).ok()?.flatten() {
        let path = entry.path();
        let epoch = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(DIR_PREFIX))
            .and_then(|e| e.parse::<usize>().ok());

        if let Some(epoch) = epoch {
            let newer = latest.as_ref().map_or(true, |(best, _)| epoch > *best);
            if newer && path.is_dir() && checkpoint_exists(&path) {
                latest = Some((epoch, path));
            }
        }
    }

    latest.map(|(_, path)| path)
}
