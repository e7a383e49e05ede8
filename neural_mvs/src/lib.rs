//! # neural_mvs
//!
//! Burn-based supervision and training for multi-view stereo depth models.
//!
//! Samples assembled by `mvs_io` are stacked into device tensors, fed to any
//! model implementing [`DepthModel`], and scored over a resolution pyramid by
//! [`MultiScaleSupervision`]. [`TrainingController`] drives epochs,
//! learning-rate schedules, checkpoints and evaluation.
//!
//! ## Modules
//!
//! - [`config`]: Burn-style configuration (`SupervisionConfig`, `TrainingConfig`)
//! - [`data`]: Batch loader and device batches
//! - [`loss`]: Regression penalties and masked reduction
//! - [`supervision`]: Pyramid, level weights and the supervision engine
//! - [`training`]: Controller, checkpoints, schedules, metrics and export
//!
//! ## Usage
//!
//! ```ignore
//! use burn::backend::{Autodiff, NdArray};
//! use neural_mvs::prelude::*;
//!
//! type B = Autodiff<NdArray>;
//!
//! let config = TrainingConfig::default().with_epochs(16);
//! let mut controller = TrainingController::<B>::new(config.clone(), "checkpoints", device)?;
//! let state = controller.init(StartMode::Resume, model, build_adam(&config))?;
//! let (state, outcome) = controller.fit(state, &train, Some(&test), None)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod loss;
pub mod model;
pub mod supervision;
pub mod training;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{SupervisionConfig, TrainingConfig};
    pub use crate::data::{BatchLoader, MvsBatch};
    pub use crate::error::{NeuralMvsError, Result};
    pub use crate::loss::RegressionLoss;
    pub use crate::model::{DepthModel, DepthOutput};
    pub use crate::supervision::{
        MultiScaleSupervision, Pyramid, RefineWeighting, SupervisionReport, WeightPreset,
    };
    pub use crate::training::{
        build_adam, CancellationToken, FitOutcome, LrSchedule, PredictionWriter, StartMode,
        TrainingController, TrainingState,
    };
}

pub use config::{SupervisionConfig, TrainingConfig};
pub use data::{BatchLoader, MvsBatch};
pub use error::{NeuralMvsError, Result};
pub use model::{DepthModel, DepthOutput};
pub use supervision::{MultiScaleSupervision, SupervisionReport};
pub use training::{TrainingController, TrainingState};
