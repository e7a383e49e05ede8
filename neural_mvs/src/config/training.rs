//! Training configuration types.

use burn::config::Config;

use mvs_io::InsufficientViewsPolicy;

use super::SupervisionConfig;
use crate::training::LrSchedule;

/// Configuration for the training loop controller.
#[derive(Config, Debug)]
pub struct TrainingConfig {
    /// Supervision configuration.
    pub supervision: SupervisionConfig,

    /// Number of epochs to train.
    #[config(default = 16)]
    pub epochs: usize,

    /// Base learning rate.
    #[config(default = 1e-3)]
    pub learning_rate: f64,

    /// Weight decay for regularization.
    #[config(default = 0.0)]
    pub weight_decay: f64,

    /// Samples per training batch.
    #[config(default = 1)]
    pub batch_size: usize,

    /// Save a checkpoint every this many epochs.
    #[config(default = 1)]
    pub save_freq: usize,

    /// Log a training summary every this many global steps.
    #[config(default = 20)]
    pub summary_freq: usize,

    /// Seed of the per-epoch shuffle.
    #[config(default = 1)]
    pub seed: u64,

    /// Shuffle training samples each epoch.
    #[config(default = true)]
    pub shuffle: bool,

    /// Learning-rate schedule over epochs.
    #[config(default = "LrSchedule::default()")]
    pub lr_schedule: LrSchedule,

    /// Policy for samples with too few neighbor views.
    #[config(default = "InsufficientViewsPolicy::Fail")]
    pub insufficient_views: InsufficientViewsPolicy,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::new(SupervisionConfig::default())
    }
}

impl TrainingConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.supervision.validate()?;
        self.lr_schedule.validate()?;

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(format!(
                "weight_decay must be non-negative, got {}",
                self.weight_decay
            ));
        }
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }
        if self.save_freq == 0 {
            return Err("save_freq must be at least 1".to_string());
        }
        if self.summary_freq == 0 {
            return Err("summary_freq must be at least 1".to_string());
        }
        Ok(())
    }
}
