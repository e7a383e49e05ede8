//! Training infrastructure for multi-view stereo depth models.
//!
//! This module provides:
//! - `TrainingController`: epochs, checkpoints and evaluation
//! - Learning-rate schedules
//! - Running metric averages
//! - Checkpoint save/load for training resumption
//! - Prediction export and offline re-scoring

mod checkpoint;
mod controller;
mod export;
mod metrics;
mod schedule;

pub use checkpoint::{
    checkpoint_dir, checkpoint_exists, find_latest_checkpoint, load_checkpoint, load_metadata,
    load_model_weights, save_checkpoint, CheckpointMetadata,
};
pub use controller::{
    build_adam, CancellationToken, EpochSummary, FitOutcome, Phase, StartMode,
    TrainingController, TrainingState,
};
pub use export::{evaluate_saved_predictions, PredictionWriter};
pub use metrics::RunningMean;
pub use schedule::LrSchedule;
