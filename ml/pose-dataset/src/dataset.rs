//! Labelled CSI feature dataset.

use std::io::Read;
use std::path::Path;

use pose_types::{DecodeError, LabelVocabulary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DataError, Result};
use crate::table::{POSE_COLUMN, PRESENCE_COLUMN, RawTable};

/// One owned labelled sample.
///
/// # Example
///
/// ```
/// use pose_dataset::Sample;
///
/// let sample = Sample::new(vec![0.1, 0.2], true, "stand");
/// assert_eq!(sample.features.len(), 2);
/// assert!(sample.presence);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// CSI feature vector.
    pub features: Vec<f32>,
    /// Whether a human is present.
    pub presence: bool,
    /// Pose-class name.
    pub pose: String,
}

impl Sample {
    /// Creates a new sample.
    #[must_use]
    pub fn new(features: Vec<f32>, presence: bool, pose: impl Into<String>) -> Self {
        Self {
            features,
            presence,
            pose: pose.into(),
        }
    }
}

/// Borrowed, encoded view of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedSample<'a> {
    /// CSI feature vector.
    pub features: &'a [f32],
    /// Presence label as `1.0` or `0.0`.
    pub presence: f32,
    /// Pose-class index in the dataset's vocabulary.
    pub pose: usize,
}

/// Labelled samples plus the vocabulary fit from their pose names.
///
/// Every sample has the same feature width. Pose indices always refer to
/// [`FeatureDataset::vocabulary`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDataset {
    feature_names: Vec<String>,
    features: Vec<Vec<f32>>,
    presence: Vec<bool>,
    pose_names: Vec<String>,
    pose_indices: Vec<usize>,
    vocabulary: LabelVocabulary,
}

impl FeatureDataset {
    /// Loads a labelled dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the file cannot be read, has no rows, has no
    /// `csi_` columns, lacks a label column, or holds an invalid cell.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let dataset = Self::from_raw(&RawTable::open(path)?)?;
        info!(
            path = %path.display(),
            samples = dataset.len(),
            features = dataset.feature_width(),
            classes = dataset.vocabulary.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Loads a labelled dataset from any CSV reader.
    ///
    /// # Errors
    ///
    /// See [`FeatureDataset::load`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_raw(&RawTable::read(reader)?)
    }

    /// Builds a dataset from owned samples.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EmptyDataset`] for no samples and
    /// [`DataError::InconsistentWidth`] if feature widths differ.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        let width = samples
            .first()
            .map(|s| s.features.len())
            .ok_or(DataError::EmptyDataset)?;

        let mut features = Vec::with_capacity(samples.len());
        let mut presence = Vec::with_capacity(samples.len());
        let mut pose_names = Vec::with_capacity(samples.len());
        for (index, sample) in samples.into_iter().enumerate() {
            if sample.features.len() != width {
                return Err(DataError::InconsistentWidth {
                    index,
                    expected: width,
                    actual: sample.features.len(),
                });
            }
            features.push(sample.features);
            presence.push(sample.presence);
            pose_names.push(sample.pose);
        }

        let feature_names = (0..width)
            .map(|i| format!("{}{i}", crate::FEATURE_PREFIX))
            .collect();
        Ok(Self::assemble(feature_names, features, presence, pose_names))
    }

    fn from_raw(raw: &RawTable) -> Result<Self> {
        let columns = raw.feature_columns()?;
        let presence_col = raw.require(PRESENCE_COLUMN)?;
        let pose_col = raw.require(POSE_COLUMN)?;

        let features = raw.features(&columns)?;
        let presence = (0..raw.records.len())
            .map(|row| raw.flag(row, presence_col))
            .collect::<Result<Vec<_>>>()?;
        let pose_names = (0..raw.records.len())
            .map(|row| match raw.cell(row, pose_col) {
                "" => Err(DataError::invalid_cell(row, POSE_COLUMN, "empty pose class")),
                name => Ok(name.to_string()),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::assemble(
            raw.feature_names(&columns),
            features,
            presence,
            pose_names,
        ))
    }

    fn assemble(
        feature_names: Vec<String>,
        features: Vec<Vec<f32>>,
        presence: Vec<bool>,
        pose_names: Vec<String>,
    ) -> Self {
        let vocabulary = LabelVocabulary::fit(&pose_names);
        // Every name was fit above, so encoding cannot miss.
        let pose_indices = pose_names
            .iter()
            .map(|name| vocabulary.encode(name).unwrap_or_default())
            .collect();
        debug!(classes = ?vocabulary.classes(), "fit pose vocabulary");
        Self {
            feature_names,
            features,
            presence,
            pose_names,
            pose_indices,
            vocabulary,
        }
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if the dataset has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns the feature vector length shared by every sample.
    #[must_use]
    pub fn feature_width(&self) -> usize {
        self.feature_names.len()
    }

    /// Returns the feature column names in table order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Returns the vocabulary fit from this dataset's pose names.
    #[must_use]
    pub const fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// Returns the raw pose name of every sample.
    #[must_use]
    pub fn pose_names(&self) -> &[String] {
        &self.pose_names
    }

    /// Returns the presence label of every sample.
    #[must_use]
    pub fn presence(&self) -> &[bool] {
        &self.presence
    }

    /// Returns the encoded pose index of every sample.
    #[must_use]
    pub fn pose_indices(&self) -> &[usize] {
        &self.pose_indices
    }

    /// Gets one encoded sample.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfBounds`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<EncodedSample<'_>> {
        let features = self
            .features
            .get(index)
            .ok_or_else(|| DataError::index_out_of_bounds(index, self.len()))?;
        Ok(EncodedSample {
            features,
            presence: if self.presence[index] { 1.0 } else { 0.0 },
            pose: self.pose_indices[index],
        })
    }

    /// Iterates over every encoded sample in order.
    pub fn iter(&self) -> impl Iterator<Item = EncodedSample<'_>> + '_ {
        (0..self.len()).map(|i| EncodedSample {
            features: &self.features[i],
            presence: if self.presence[i] { 1.0 } else { 0.0 },
            pose: self.pose_indices[i],
        })
    }

    /// Encodes every pose name through another vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownLabel`] for the first name `vocabulary`
    /// does not contain.
    pub fn encode_with(&self, vocabulary: &LabelVocabulary) -> pose_types::Result<Vec<usize>> {
        self.pose_names
            .iter()
            .map(|name| vocabulary.encode(name))
            .collect()
    }

    /// Returns a copy of this dataset whose pose indices refer to `vocabulary`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownLabel`] if a pose name is not in
    /// `vocabulary`.
    pub fn with_vocabulary(
        &self,
        vocabulary: &LabelVocabulary,
    ) -> std::result::Result<Self, DecodeError> {
        let pose_indices = self.encode_with(vocabulary)?;
        Ok(Self {
            pose_indices,
            vocabulary: vocabulary.clone(),
            ..self.clone()
        })
    }

    /// Returns the owned sample at `index`.
    #[must_use]
    pub fn sample(&self, index: usize) -> Option<Sample> {
        Some(Sample {
            features: self.features.get(index)?.clone(),
            presence: self.presence[index],
            pose: self.pose_names[index].clone(),
        })
    }

    /// Returns the raw feature rows.
    #[must_use]
    pub fn features(&self) -> &[Vec<f32>] {
        &self.features
    }
}
