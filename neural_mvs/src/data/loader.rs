//! Epoch-wise batching over a sample source.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use mvs_io::{InsufficientViewsPolicy, Sample, SampleSource};

use crate::error::Result;

/// Splits a [`SampleSource`] into batches, optionally shuffled per epoch.
///
/// Shuffling is seeded with `seed + epoch`, so an epoch replays identically
/// after a resume.
pub struct BatchLoader<'a, S: SampleSource + ?Sized> {
    source: &'a S,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
    drop_last: bool,
    policy: InsufficientViewsPolicy,
}

impl<'a, S: SampleSource + ?Sized> BatchLoader<'a, S> {
    /// Sequential loader with `batch_size` samples per batch (minimum 1).
    pub fn new(source: &'a S, batch_size: usize) -> Self {
        Self {
            source,
            batch_size: batch_size.max(1),
            shuffle: false,
            seed: 0,
            drop_last: false,
            policy: InsufficientViewsPolicy::Fail,
        }
    }

    /// Shuffle each epoch with `seed`.
    pub fn with_shuffle(mut self, shuffle: bool, seed: u64) -> Self {
        self.shuffle = shuffle;
        self.seed = seed;
        self
    }

    /// Drop a trailing partial batch.
    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// Policy for samples with too few neighbor views.
    pub fn with_policy(mut self, policy: InsufficientViewsPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        let len = self.source.len();
        if self.drop_last {
            len / self.batch_size
        } else {
            len.div_ceil(self.batch_size)
        }
    }

    /// Sample order for `epoch`.
    pub fn epoch_order(&self, epoch: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.source.len()).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(epoch as u64));
            order.shuffle(&mut rng);
        }
        order
    }

    /// Batches of `epoch`, assembled lazily.
    ///
    /// A batch may hold fewer samples than requested when the skip policy
    /// drops some.
    pub fn batches(&self, epoch: usize) -> impl Iterator<Item = Result<Vec<Sample>>> + '_ {
        let order = self.epoch_order(epoch);
        let batch_size = self.batch_size;
        let num_batches = self.num_batches();

        (0..num_batches).map(move |b| {
            let start = b * batch_size;
            let end = (start + batch_size).min(order.len());
            Ok(self.source.assemble_batch(&order[start..end], self.policy)?)
        })
    }
}
