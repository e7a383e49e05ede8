//! Training loop controller.
//!
//! The controller runs `Init → Epoch(k) → [Checkpoint] → Evaluate → Epoch(k+1)
//! → … → Done`. The [`TrainingState`] is moved into every epoch and handed
//! back afterwards, so there is no hidden mutable training state.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use burn::module::AutodiffModule;
use burn::optim::decay::WeightDecayConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;

use mvs_io::SampleSource;

use crate::config::TrainingConfig;
use crate::data::{BatchLoader, MvsBatch};
use crate::error::{NeuralMvsError, Result};
use crate::model::DepthModel;
use crate::supervision::MultiScaleSupervision;

use super::checkpoint::{
    find_latest_checkpoint, load_checkpoint, load_model_weights, save_checkpoint,
};
use super::export::PredictionWriter;
use super::metrics::RunningMean;

/// Model, optimizer and progress of a training run.
#[derive(Debug)]
pub struct TrainingState<B, M, O> {
    /// Index of the next epoch to run.
    pub epoch: usize,
    /// Optimizer steps taken so far.
    pub global_step: usize,
    /// The model being trained.
    pub model: M,
    /// Optimizer with its accumulated moments.
    pub optimizer: O,
    _backend: PhantomData<B>,
}

impl<B, M, O> TrainingState<B, M, O> {
    /// State at epoch 0.
    pub fn new(model: M, optimizer: O) -> Self {
        Self {
            epoch: 0,
            global_step: 0,
            model,
            optimizer,
            _backend: PhantomData,
        }
    }
}

/// How a run obtains its initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartMode {
    /// Untrained model, epoch 0.
    Fresh,
    /// Continue after the latest checkpoint in the checkpoint directory.
    Resume,
    /// Model weights from a checkpoint or model file, fresh optimizer, epoch 0.
    LoadWeights(PathBuf),
}

/// Where the controller is in the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not yet started.
    Init,
    /// Training epoch `k`.
    Epoch(usize),
    /// Saving the checkpoint of epoch `k`.
    Checkpoint(usize),
    /// Evaluating after epoch `k`.
    Evaluate(usize),
    /// Every epoch ran, or the run was cancelled.
    Done,
}

/// How a run or epoch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// Ran to the end.
    Completed,
    /// Stopped at a batch boundary by the cancellation token.
    Cancelled,
}

/// Result of one training epoch.
#[derive(Debug, Clone)]
pub struct EpochSummary {
    /// Whether the epoch ran to the end.
    pub outcome: FitOutcome,
    /// Running means of the supervision scalars.
    pub metrics: BTreeMap<String, f32>,
    /// Optimizer steps taken in this epoch.
    pub steps: usize,
}

/// Shared flag asking a run to stop at the next batch boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Adam with betas `(0.9, 0.999)` and the configured weight decay.
pub fn build_adam<B, M>(config: &TrainingConfig) -> impl Optimizer<M, B>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let weight_decay = (config.weight_decay > 0.0)
        .then(|| WeightDecayConfig::new(config.weight_decay as f32));

    AdamConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_weight_decay(weight_decay)
        .init::<B, M>()
}

/// Drives epochs, checkpoints and evaluation for a [`DepthModel`].
#[derive(Debug)]
pub struct TrainingController<B: AutodiffBackend> {
    config: TrainingConfig,
    supervision: MultiScaleSupervision<B>,
    eval_supervision: MultiScaleSupervision<B::InnerBackend>,
    checkpoint_dir: PathBuf,
    device: B::Device,
    cancel: CancellationToken,
    phase: Phase,
}

impl<B: AutodiffBackend> TrainingController<B> {
    /// Controller writing checkpoints under `checkpoint_dir`.
    pub fn new(
        config: TrainingConfig,
        checkpoint_dir: impl Into<PathBuf>,
        device: B::Device,
    ) -> Result<Self> {
        config.validate().map_err(NeuralMvsError::config)?;
        let supervision = MultiScaleSupervision::new(config.supervision.clone())?;
        let eval_supervision = MultiScaleSupervision::new(config.supervision.clone())?;

        Ok(Self {
            config,
            supervision,
            eval_supervision,
            checkpoint_dir: checkpoint_dir.into(),
            device,
            cancel: CancellationToken::new(),
            phase: Phase::Init,
        })
    }

    /// Use `token` to stop the run from another thread.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The cancellation token of this controller.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Training configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Checkpoint directory.
    pub fn checkpoint_dir(&self) -> &Path {
        &self.checkpoint_dir
    }

    /// Build the initial state.
    ///
    /// `model` and `optimizer` are used as they are for [`StartMode::Fresh`]
    /// and as the structure records are loaded into otherwise.
    pub fn init<M, O>(
        &mut self,
        mode: StartMode,
        model: M,
        optimizer: O,
    ) -> Result<TrainingState<B, M, O>>
    where
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        self.phase = Phase::Init;

        let state = match mode {
            StartMode::Fresh => TrainingState::new(model, optimizer),
            StartMode::Resume => {
                let dir = find_latest_checkpoint(&self.checkpoint_dir).ok_or_else(|| {
                    NeuralMvsError::NoCheckpoint {
                        dir: self.checkpoint_dir.clone(),
                    }
                })?;
                let mut state = load_checkpoint(&dir, model, optimizer, &self.device)?;
                state.epoch += 1;
                state
            }
            StartMode::LoadWeights(path) => {
                let model = load_model_weights::<B, M>(&path, model, &self.device)?;
                TrainingState::new(model, optimizer)
            }
        };

        log::info!(
            "Starting at epoch {} of {} (step {})",
            state.epoch,
            self.config.epochs,
            state.global_step
        );
        Ok(state)
    }

    /// Run one training epoch over `train`.
    ///
    /// On cancellation the state is returned as of the last completed step,
    /// with the epoch counter unchanged.
    pub fn train_epoch<M, O, S>(
        &mut self,
        mut state: TrainingState<B, M, O>,
        train: &S,
    ) -> Result<(TrainingState<B, M, O>, EpochSummary)>
    where
        M: AutodiffModule<B> + DepthModel<B>,
        O: Optimizer<M, B>,
        S: SampleSource + ?Sized,
    {
        let epoch = state.epoch;
        self.phase = Phase::Epoch(epoch);

        let lr = self
            .config
            .lr_schedule
            .learning_rate(self.config.learning_rate, epoch);
        let loader = BatchLoader::new(train, self.config.batch_size)
            .with_shuffle(self.config.shuffle, self.config.seed)
            .with_policy(self.config.insufficient_views);
        let num_batches = loader.num_batches();

        log::info!(
            "Epoch {}/{}: {} batches, lr {:.2e}",
            epoch,
            self.config.epochs,
            num_batches,
            lr
        );

        let mut running = RunningMean::new();
        let mut steps = 0;

        let mut batches = loader.batches(epoch);
        for iter in 0..num_batches {
            // Checked before the batch is loaded
            if self.cancel.is_cancelled() {
                log::warn!("Cancelled in epoch {} after {} steps", epoch, steps);
                return Ok((
                    state,
                    EpochSummary {
                        outcome: FitOutcome::Cancelled,
                        metrics: running.mean(),
                        steps,
                    },
                ));
            }

            let start = Instant::now();
            let Some(samples) = batches.next() else {
                break;
            };
            let samples = samples?;
            if samples.is_empty() {
                log::warn!("Batch {} of epoch {} is empty, skipping", iter, epoch);
                continue;
            }

            let batch = MvsBatch::<B>::from_samples(&samples, &self.device)?;
            let output = state.model.forward(
                batch.images.clone(),
                batch.projections.clone(),
                batch.depth_values.clone(),
            );
            let report = self.supervision.score(&output, &batch)?;
            let scalars = report.to_scalars();

            let grads = report.loss.backward();
            let grads = GradientsParams::from_grads(grads, &state.model);
            state.model = state.optimizer.step(lr, state.model, grads);
            state.global_step += 1;
            steps += 1;

            running.update(&scalars)?;

            log::info!(
                "Epoch {}/{}, Iter {}/{}, lr {:.2e}, train loss = {:.4}, time = {:.3}",
                epoch,
                self.config.epochs,
                iter,
                num_batches,
                lr,
                scalars.get("loss").copied().unwrap_or_default(),
                start.elapsed().as_secs_f32()
            );
            if state.global_step % self.config.summary_freq == 0 {
                running.log(&format!("train step {}", state.global_step));
            }
        }

        running.log(&format!("Epoch {epoch} train"));
        Ok((
            state,
            EpochSummary {
                outcome: FitOutcome::Completed,
                metrics: running.mean(),
                steps,
            },
        ))
    }

    /// Score `model` on every sample of `source` without touching any state.
    ///
    /// With a `writer`, the finest depth and the confidence of every sample
    /// are saved as PFM files.
    pub fn evaluate<IM, S>(
        &self,
        model: &IM,
        source: &S,
        label: &str,
        writer: Option<&PredictionWriter>,
    ) -> Result<BTreeMap<String, f32>>
    where
        IM: DepthModel<B::InnerBackend>,
        S: SampleSource + ?Sized,
    {
        let loader = BatchLoader::new(source, self.config.batch_size)
            .with_policy(self.config.insufficient_views);
        let mut running = RunningMean::new();

        for samples in loader.batches(0) {
            let samples = samples?;
            if samples.is_empty() {
                continue;
            }

            let batch = MvsBatch::<B::InnerBackend>::from_samples(&samples, &self.device)?;
            let output = model.forward(
                batch.images.clone(),
                batch.projections.clone(),
                batch.depth_values.clone(),
            );
            let report = self.eval_supervision.score(&output, &batch)?;
            running.update(&report.to_scalars())?;

            if let (Some(writer), Some(depth)) = (writer, output.depth.first()) {
                writer.write(
                    depth.clone(),
                    output.photometric_confidence.clone(),
                    &batch.names,
                )?;
            }
        }

        running.log(label);
        Ok(running.mean())
    }

    /// Train until `epochs` is reached, saving checkpoints and evaluating
    /// after every epoch.
    pub fn fit<M, O, S>(
        &mut self,
        mut state: TrainingState<B, M, O>,
        train: &S,
        test: Option<&S>,
        val: Option<&S>,
    ) -> Result<(TrainingState<B, M, O>, FitOutcome)>
    where
        M: AutodiffModule<B> + DepthModel<B>,
        M::InnerModule: DepthModel<B::InnerBackend>,
        O: Optimizer<M, B>,
        S: SampleSource + ?Sized,
    {
        while state.epoch < self.config.epochs {
            let epoch = state.epoch;
            let (next, summary) = self.train_epoch(state, train)?;
            state = next;

            if summary.outcome == FitOutcome::Cancelled {
                self.phase = Phase::Done;
                return Ok((state, FitOutcome::Cancelled));
            }

            if (epoch + 1) % self.config.save_freq == 0 {
                self.phase = Phase::Checkpoint(epoch);
                save_checkpoint(&self.checkpoint_dir, &state)?;
            }

            self.phase = Phase::Evaluate(epoch);
            let model = state.model.valid();
            for (label, source) in [("test", test), ("val", val)] {
                if let Some(source) = source {
                    self.evaluate(&model, source, &format!("Epoch {epoch} {label}"), None)?;
                }
            }

            state.epoch += 1;
        }

        self.phase = Phase::Done;
        log::info!("Training done after {} steps", state.global_step);
        Ok((state, FitOutcome::Completed))
    }
}
