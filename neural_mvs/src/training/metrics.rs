//! Running averages of scalar metrics.

use std::collections::BTreeMap;

use crate::error::{NeuralMvsError, Result};

/// Running mean over a fixed set of named scalars.
///
/// The key set is fixed by the first update after construction or
/// [`reset`](Self::reset).
#[derive(Debug, Clone, Default)]
pub struct RunningMean {
    sums: BTreeMap<String, f64>,
    count: usize,
}

impl RunningMean {
    /// Empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one set of values.
    pub fn update(&mut self, values: &BTreeMap<String, f32>) -> Result<()> {
        if self.count > 0 && !self.sums.keys().eq(values.keys()) {
            return Err(NeuralMvsError::MetricKeyMismatch {
                expected: self.sums.keys().cloned().collect(),
                got: values.keys().cloned().collect(),
            });
        }

        for (key, value) in values {
            *self.sums.entry(key.clone()).or_insert(0.0) += f64::from(*value);
        }
        self.count += 1;
        Ok(())
    }

    /// Mean of every key over the updates so far.
    pub fn mean(&self) -> BTreeMap<String, f32> {
        let n = self.count.max(1) as f64;
        self.sums
            .iter()
            .map(|(key, sum)| (key.clone(), (sum / n) as f32))
            .collect()
    }

    /// Number of updates.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Forget every value and the key set.
    pub fn reset(&mut self) {
        self.sums.clear();
        self.count = 0;
    }

    /// Log the current means.
    pub fn log(&self, prefix: &str) {
        let line = self
            .mean()
            .iter()
            .map(|(k, v)| format!("{k}={v:.6}"))
            .collect::<Vec<_>>()
            .join(" ");
        log::info!("{} avg over {} batches: {}", prefix, self.count, line);
    }
}
