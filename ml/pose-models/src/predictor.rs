//! Inference over feature vectors using a loaded checkpoint.

use std::path::Path;

use burn::prelude::Backend;
use burn::tensor::{Tensor, TensorData};
use pose_dataset::FeatureTable;
use pose_types::{LabelVocabulary, PRESENCE_THRESHOLD, PoseReport};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checkpoint::{Checkpoint, ModelStore};
use crate::classifier::{ForwardMode, SequenceClassifier, SequenceClassifierConfig};
use crate::error::{ModelError, Result};

/// The decision for one feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Presence probability in `[0, 1]`.
    pub presence_probability: f32,
    /// `presence_probability > 0.5`.
    pub presence: bool,
    /// Decoded pose label, or `"unknown"` if the arg-max index is not in
    /// the vocabulary.
    pub pose: String,
}

/// Parallel per-sample outputs, indexed like the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    /// Presence decisions.
    pub presence: Vec<bool>,
    /// Pose labels.
    pub pose: Vec<String>,
    /// Presence probabilities.
    pub presence_probability: Vec<f32>,
}

impl Predictions {
    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.presence.len()
    }

    /// Returns `true` if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presence.is_empty()
    }

    /// Returns the prediction for one sample.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Prediction> {
        Some(Prediction {
            presence_probability: *self.presence_probability.get(index)?,
            presence: *self.presence.get(index)?,
            pose: self.pose.get(index)?.clone(),
        })
    }

    /// Iterates over per-sample predictions.
    pub fn iter(&self) -> impl Iterator<Item = Prediction> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

/// Runs the classifier in evaluation mode and decodes its outputs.
///
/// Built once from a checkpoint and passed explicitly to whoever needs
/// it; prediction takes `&self`.
#[derive(Debug, Clone)]
pub struct Predictor<B: Backend> {
    model: SequenceClassifier<B>,
    vocabulary: LabelVocabulary,
    device: B::Device,
}

impl<B: Backend> Predictor<B> {
    /// Creates a predictor from a model and its vocabulary.
    #[must_use]
    pub fn new(
        model: SequenceClassifier<B>,
        vocabulary: LabelVocabulary,
        device: B::Device,
    ) -> Self {
        Self {
            model,
            vocabulary,
            device,
        }
    }

    /// Creates a predictor from a loaded checkpoint.
    #[must_use]
    pub fn from_loaded(checkpoint: Checkpoint<B>, device: B::Device) -> Self {
        Self::new(checkpoint.model, checkpoint.vocabulary, device)
    }

    /// Loads a checkpoint and builds a predictor for it.
    ///
    /// # Errors
    ///
    /// Returns a persistence [`ModelError`] if the weights are missing,
    /// unreadable, or incompatible with `config`. A missing vocabulary is
    /// not an error.
    pub fn from_checkpoint(
        path: impl AsRef<Path>,
        config: SequenceClassifierConfig,
        device: B::Device,
    ) -> Result<Self> {
        let checkpoint = ModelStore::new(config).load::<B>(path.as_ref(), &device)?;
        Ok(Self::from_loaded(checkpoint, device))
    }

    /// Returns the vocabulary used for decoding.
    #[must_use]
    pub const fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// Returns the underlying model.
    #[must_use]
    pub const fn model(&self) -> &SequenceClassifier<B> {
        &self.model
    }

    /// Predicts a single feature vector (a batch of one).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Shape`] if the vector length is wrong.
    pub fn predict_one(&self, features: &[f32]) -> Result<Prediction> {
        self.predict(&[features])?
            .get(0)
            .ok_or_else(|| ModelError::shape("1 prediction", "0 predictions"))
    }

    /// Predicts a batch of feature vectors.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Shape`] for an empty batch or any vector whose
    /// length differs from the model's input size.
    pub fn predict<R: AsRef<[f32]>>(&self, rows: &[R]) -> Result<Predictions> {
        let input_size = self.model.input_size();
        self.model.check_input([rows.len(), input_size])?;
        let mut flat = Vec::with_capacity(rows.len() * input_size);
        for row in rows {
            let row = row.as_ref();
            self.model.check_input([1, row.len()])?;
            flat.extend_from_slice(row);
        }

        let data = TensorData::new(flat, [rows.len(), input_size]);
        let input = Tensor::<B, 2>::from_data(data, &self.device);
        let output = self.model.forward(input, ForwardMode::Eval)?;

        let probabilities = output
            .presence
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| ModelError::tensor_data(format!("{e:?}")))?;
        let indices = output
            .pose_logits
            .argmax(1)
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| ModelError::tensor_data(format!("{e:?}")))?;

        let pose = indices
            .iter()
            .map(|&i| {
                usize::try_from(i)
                    .map_or(pose_types::UNKNOWN_POSE, |i| self.vocabulary.decode_or_unknown(i))
                    .to_string()
            })
            .collect();
        debug!(samples = rows.len(), "predicted batch");

        Ok(Predictions {
            presence: probabilities.iter().map(|&p| p > PRESENCE_THRESHOLD).collect(),
            pose,
            presence_probability: probabilities,
        })
    }

    /// Builds the pose report for the first row of a table.
    ///
    /// The pose is reported only when presence is detected; joints come
    /// from the table's first row, zeroed if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Shape`] if the table is empty or its feature
    /// width differs from the model's input size.
    pub fn report(&self, table: &FeatureTable) -> Result<PoseReport> {
        let row = table.row(0).ok_or_else(|| {
            ModelError::shape(format!("[1, {}]", self.model.input_size()), "[0, _]")
        })?;
        let prediction = self.predict_one(row)?;
        Ok(PoseReport::new(
            prediction.presence_probability,
            &prediction.pose,
            table.skeleton(0),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use pose_types::NO_POSE;

    type TestBackend = NdArray<f32>;

    fn predictor(vocabulary: LabelVocabulary) -> Predictor<TestBackend> {
        let config = SequenceClassifierConfig::new(4)
            .with_hidden_size(4)
            .with_dense_size(4)
            .with_num_classes(5);
        let device = Default::default();
        Predictor::new(SequenceClassifier::new(&config, &device), vocabulary, device)
    }

    #[test]
    fn outputs_are_parallel() {
        let predictor = predictor(LabelVocabulary::default_poses());
        let rows = vec![vec![0.1; 4], vec![0.5; 4], vec![-0.3; 4]];
        let predictions = predictor.predict(&rows).unwrap();

        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions.pose.len(), 3);
        assert_eq!(predictions.presence_probability.len(), 3);
        for p in predictions.iter() {
            assert!((0.0..=1.0).contains(&p.presence_probability));
            assert_eq!(p.presence, p.presence_probability > PRESENCE_THRESHOLD);
            assert!(predictor.vocabulary().contains(&p.pose));
        }
    }

    #[test]
    fn undecodable_index_is_unknown() {
        let predictor = predictor(LabelVocabulary::empty());
        let prediction = predictor.predict_one(&[0.2; 4]).unwrap();
        assert_eq!(prediction.pose, pose_types::UNKNOWN_POSE);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let predictor = predictor(LabelVocabulary::default_poses());
        let rows: Vec<Vec<f32>> = vec![vec![0.0; 4], vec![0.0; 3]];
        assert!(matches!(predictor.predict(&rows), Err(ModelError::Shape { .. })));
    }

    #[test]
    fn empty_batch_is_rejected() {
        let predictor = predictor(LabelVocabulary::default_poses());
        let rows: Vec<Vec<f32>> = Vec::new();
        assert!(matches!(predictor.predict(&rows), Err(ModelError::Shape { .. })));
    }

    #[test]
    fn report_uses_first_row() {
        let predictor = predictor(LabelVocabulary::default_poses());
        let table = FeatureTable::from_rows(vec![vec![0.3; 4], vec![0.9; 4]]).unwrap();
        let report = predictor.report(&table).unwrap();
        let first = predictor.predict_one(&[0.3; 4]).unwrap();

        assert_eq!(report.human_presence, first.presence);
        if first.presence {
            assert_eq!(report.pose, first.pose);
        } else {
            assert_eq!(report.pose, NO_POSE);
        }
        assert_eq!(report.joint_coordinates.len(), 17);
    }

    #[test]
    fn report_rejects_wrong_width() {
        let predictor = predictor(LabelVocabulary::default_poses());
        let table = FeatureTable::from_rows(vec![vec![0.3; 6]]).unwrap();
        assert!(matches!(predictor.report(&table), Err(ModelError::Shape { .. })));
    }
}
