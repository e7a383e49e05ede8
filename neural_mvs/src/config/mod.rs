//! Configuration types for neural_mvs.
//!
//! Burn-style configuration structs for supervision and training. Every
//! config serializes to JSON through burn's `Config` trait.

mod supervision;
mod training;

pub use supervision::SupervisionConfig;
pub use training::TrainingConfig;

pub use crate::loss::RegressionLoss;
pub use crate::supervision::{Pyramid, RefineWeighting, WeightPreset};
pub use crate::training::LrSchedule;
