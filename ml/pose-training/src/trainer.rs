//! Training loop implementation.

use std::time::Instant;

use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::Backend;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Int, Tensor, TensorData};
use pose_dataset::{BatchPlan, DataError, DatasetSummary, FeatureBatch, FeatureDataset};
use pose_models::{ForwardMode, SequenceClassifier};
use pose_types::LabelVocabulary;
use tracing::{debug, info};

use crate::config::TrainingConfig;
use crate::error::{Result, TrainingError};
use crate::gate::{CheckpointGate, CheckpointSink};
use crate::loss::joint_loss;
use crate::metrics::{EpochMetrics, TrainingMetrics};

/// Allowed distance of the presence ratio from 0.5 before the training
/// set is logged as unbalanced.
const PRESENCE_BALANCE_TOLERANCE: f32 = 0.2;

/// Trains a [`SequenceClassifier`] and persists its improving checkpoints.
///
/// The model is trained on an autodiff backend `B`; validation and
/// persistence run on the inner backend.
///
/// # Example
///
/// ```no_run
/// use pose_dataset::FeatureDataset;
/// use pose_models::{ModelStore, TrainingBackend, default_device};
/// use pose_training::{Trainer, TrainingConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let train = FeatureDataset::load("train.csv")?;
/// let valid = FeatureDataset::load("valid.csv")?;
///
/// let config = TrainingConfig::new(10);
/// let mut store = ModelStore::new(config.model.clone());
/// let device = default_device::<TrainingBackend>();
/// let mut trainer = Trainer::<TrainingBackend>::new(config, device)?;
///
/// let metrics = trainer.train(&train, &valid, &mut store)?;
/// println!("{}", metrics.summary());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Trainer<B: AutodiffBackend> {
    config: TrainingConfig,
    model: SequenceClassifier<B>,
    vocabulary: LabelVocabulary,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// Creates a trainer with a freshly initialized model.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`] if the config is invalid.
    pub fn new(config: TrainingConfig, device: B::Device) -> Result<Self> {
        config.validate()?;
        let model = config.model.init::<B>(&device)?;
        Ok(Self {
            config,
            model,
            vocabulary: LabelVocabulary::empty(),
            device,
        })
    }

    /// Returns the training configuration.
    #[must_use]
    pub const fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Returns the model as of the last completed epoch.
    #[must_use]
    pub const fn model(&self) -> &SequenceClassifier<B> {
        &self.model
    }

    /// Returns the vocabulary fitted by the last call to [`Trainer::train`].
    #[must_use]
    pub const fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// Computes the number of batches for a dataset size.
    #[must_use]
    pub const fn num_batches(&self, dataset_size: usize) -> usize {
        dataset_size.div_ceil(self.config.batch_size)
    }

    /// Runs the full training loop.
    ///
    /// The vocabulary is refit from `train`, replacing any previous one.
    /// After every epoch the mean validation loss is offered to a
    /// [`CheckpointGate`]; only strict improvements reach `sink`, written
    /// to `config.checkpoint_path`.
    ///
    /// # Errors
    ///
    /// - [`DataError::EmptyDataset`] if either dataset is empty
    /// - a shape error if a feature width differs from the model input size
    /// - [`TrainingError::VocabularyTooLarge`] if `train` has more classes
    ///   than the pose head
    /// - [`TrainingError::Label`] if `valid` has a pose not seen in `train`
    /// - [`TrainingError::NumericalInstability`] if a loss is not finite
    /// - any error from `sink`
    pub fn train<S>(
        &mut self,
        train: &FeatureDataset,
        valid: &FeatureDataset,
        sink: &mut S,
    ) -> Result<TrainingMetrics>
    where
        S: CheckpointSink<B::InnerBackend>,
    {
        self.config.validate()?;
        if train.is_empty() || valid.is_empty() {
            return Err(DataError::EmptyDataset.into());
        }
        self.model.check_input([train.len(), train.feature_width()])?;
        self.model.check_input([valid.len(), valid.feature_width()])?;

        let vocabulary = train.vocabulary().clone();
        if vocabulary.len() > self.model.num_classes() {
            return Err(TrainingError::VocabularyTooLarge {
                classes: vocabulary.len(),
                num_classes: self.model.num_classes(),
            });
        }
        let valid = valid.with_vocabulary(&vocabulary)?;
        self.vocabulary = vocabulary.clone();

        let summary = DatasetSummary::from_dataset(train);
        info!(
            train = train.len(),
            valid = valid.len(),
            classes = ?vocabulary.classes(),
            presence_ratio = summary.presence_ratio,
            presence_balanced = summary.is_balanced(PRESENCE_BALANCE_TOLERANCE),
            "starting training"
        );

        let mut model = self.model.clone();
        let mut optim = AdamConfig::new().init::<B, SequenceClassifier<B>>();
        let mut plan = BatchPlan::new(self.config.batch_size, self.config.seed);
        let mut gate = CheckpointGate::new();
        let mut metrics = TrainingMetrics::new();
        metrics.num_classes = vocabulary.len();

        for epoch in 0..self.config.num_epochs {
            let started = Instant::now();
            let mut losses = Vec::with_capacity(self.num_batches(train.len()));
            for indices in plan.shuffled(train.len()) {
                let batch = FeatureBatch::gather(train, &indices)?;
                let (features, presence, poses) = batch_tensors::<B>(&batch, &self.device);
                let output = model.forward(features, ForwardMode::Train)?;
                let loss = joint_loss(output.presence, presence, output.pose_logits, poses);
                losses.push(finite_scalar(&loss, epoch)?);

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optim.step(self.config.learning_rate, model, grads);
            }
            let train_loss = mean(&losses);
            let train_secs = started.elapsed().as_secs_f32();

            let started = Instant::now();
            let eval = model.valid();
            let val_loss = evaluate(&eval, &valid, &plan, &self.device, epoch)?;
            let val_secs = started.elapsed().as_secs_f32();

            let improved = gate.observe(val_loss);
            if improved {
                let path = sink.persist(&eval, &vocabulary, &self.config.checkpoint_path)?;
                info!(
                    epoch,
                    val_loss,
                    path = %path.display(),
                    "validation improved, checkpoint saved"
                );
                metrics.checkpoint_path = Some(path);
            }

            info!(
                epoch,
                train_loss,
                val_loss,
                best = gate.best(),
                "epoch {}/{} complete",
                epoch + 1,
                self.config.num_epochs
            );
            metrics.add_epoch(
                EpochMetrics::new(epoch, train_loss, val_loss)
                    .with_learning_rate(self.config.learning_rate)
                    .with_times(train_secs, val_secs)
                    .with_samples(train.len(), valid.len())
                    .with_checkpoint(improved),
            );
        }

        self.model = model;
        info!(
            best_val_loss = gate.best(),
            checkpoints = gate.saves(),
            "training finished"
        );
        Ok(metrics)
    }
}

/// Mean joint loss over `dataset` in evaluation mode, batches in order.
fn evaluate<B: Backend>(
    model: &SequenceClassifier<B>,
    dataset: &FeatureDataset,
    plan: &BatchPlan,
    device: &B::Device,
    epoch: usize,
) -> Result<f32> {
    let mut losses = Vec::with_capacity(plan.num_batches(dataset.len()));
    for indices in plan.sequential(dataset.len()) {
        let batch = FeatureBatch::gather(dataset, &indices)?;
        let (features, presence, poses) = batch_tensors::<B>(&batch, device);
        let output = model.forward(features, ForwardMode::Eval)?;
        let loss = joint_loss(output.presence, presence, output.pose_logits, poses);
        losses.push(finite_scalar(&loss, epoch)?);
    }
    debug!(epoch, batches = losses.len(), "validation pass done");
    Ok(mean(&losses))
}

/// Converts a batch into `(features [n, d], presence [n, 1], poses [n])`.
#[allow(clippy::cast_possible_wrap)]
fn batch_tensors<B: Backend>(
    batch: &FeatureBatch,
    device: &B::Device,
) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 1, Int>) {
    let features = Tensor::from_data(
        TensorData::new(batch.features.clone(), [batch.rows, batch.width]),
        device,
    );
    let presence = Tensor::from_data(
        TensorData::new(batch.presence.clone(), [batch.rows, 1]),
        device,
    );
    let poses: Vec<i64> = batch.poses.iter().map(|&p| p as i64).collect();
    let poses = Tensor::from_data(TensorData::new(poses, [batch.rows]), device);
    (features, presence, poses)
}

fn finite_scalar<B: Backend>(loss: &Tensor<B, 1>, epoch: usize) -> Result<f32> {
    let value: f32 = loss.clone().into_scalar().elem();
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TrainingError::numerical_instability(format!(
            "loss is {value} in epoch {epoch}"
        )))
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        f32::NAN
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}
