//! Learning-rate schedules over epochs.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Learning rate as a function of the epoch index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LrSchedule {
    /// The base rate throughout.
    Constant,
    /// Multiply by `gamma` at each milestone epoch reached.
    MultiStep {
        /// Epochs at which the rate decays.
        milestones: Vec<usize>,
        /// Decay factor per milestone.
        gamma: f64,
    },
    /// Cosine annealing from the base rate to `floor` over `horizon` epochs.
    Cosine {
        /// Epochs until the floor is reached.
        horizon: usize,
        /// Final learning rate.
        floor: f64,
    },
}

impl Default for LrSchedule {
    fn default() -> Self {
        Self::MultiStep {
            milestones: vec![10, 12, 14],
            gamma: 0.5,
        }
    }
}

impl LrSchedule {
    /// Parse `"e1,e2,...:d"`: decay by `1/d` at each listed epoch.
    pub fn parse_multistep(text: &str) -> Result<Self, String> {
        let (epochs, divisor) = text
            .split_once(':')
            .ok_or_else(|| format!("expected 'epochs:divisor', got '{text}'"))?;

        let milestones = epochs
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|e| format!("invalid milestone '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let divisor: f64 = divisor
            .trim()
            .parse()
            .map_err(|e| format!("invalid divisor '{divisor}': {e}"))?;
        if !(divisor.is_finite() && divisor > 0.0) {
            return Err(format!("divisor must be positive, got {divisor}"));
        }

        let schedule = Self::MultiStep {
            milestones,
            gamma: 1.0 / divisor,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Cosine annealing with the default floor of `2e-6`.
    pub fn cosine(horizon: usize) -> Self {
        Self::Cosine {
            horizon,
            floor: 2e-6,
        }
    }

    /// Learning rate for `epoch` given `base`.
    pub fn learning_rate(&self, base: f64, epoch: usize) -> f64 {
        match self {
            Self::Constant => base,
            Self::MultiStep { milestones, gamma } => {
                let reached = milestones.iter().filter(|&&m| m <= epoch).count();
                base * gamma.powi(reached as i32)
            }
            Self::Cosine { horizon, floor } => {
                let t = epoch.min(*horizon) as f64 / (*horizon).max(1) as f64;
                floor + (base - floor) * 0.5 * (1.0 + (PI * t).cos())
            }
        }
    }

    /// Validate the schedule.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Constant => Ok(()),
            Self::MultiStep { milestones, gamma } => {
                if !(gamma.is_finite() && *gamma > 0.0) {
                    return Err(format!("gamma must be positive, got {gamma}"));
                }
                if milestones.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(format!(
                        "milestones must be strictly increasing, got {milestones:?}"
                    ));
                }
                Ok(())
            }
            Self::Cosine { horizon, floor } => {
                if *horizon == 0 {
                    return Err("cosine horizon must be at least 1".to_string());
                }
                if !(floor.is_finite() && *floor >= 0.0) {
                    return Err(format!("floor must be non-negative, got {floor}"));
                }
                Ok(())
            }
        }
    }
}
