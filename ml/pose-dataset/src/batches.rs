//! Batch planning for training and validation passes.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::dataset::FeatureDataset;
use crate::error::{DataError, Result};

/// Produces batch index lists over a dataset.
///
/// Training batches are drawn in a fresh shuffled order on every call;
/// validation batches are always sequential. The RNG is seeded once, so a
/// seeded plan yields the same sequence of epochs on every run.
///
/// # Example
///
/// ```
/// use pose_dataset::BatchPlan;
///
/// let mut plan = BatchPlan::new(4, Some(7));
/// assert_eq!(plan.sequential(10), vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
///
/// let shuffled = plan.shuffled(10);
/// assert_eq!(shuffled.len(), 3);
/// let mut all: Vec<usize> = shuffled.into_iter().flatten().collect();
/// all.sort_unstable();
/// assert_eq!(all, (0..10).collect::<Vec<_>>());
/// ```
#[derive(Debug, Clone)]
pub struct BatchPlan {
    batch_size: usize,
    rng: ChaCha8Rng,
}

impl BatchPlan {
    /// Creates a plan. A batch size of zero is treated as one.
    #[must_use]
    pub fn new(batch_size: usize, seed: Option<u64>) -> Self {
        Self {
            batch_size: batch_size.max(1),
            rng: seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64),
        }
    }

    /// Returns the batch size.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches needed to cover `len` samples.
    #[must_use]
    pub const fn num_batches(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size)
    }

    /// Batches over `0..len` in a freshly shuffled order.
    pub fn shuffled(&mut self, len: usize) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(&mut self.rng);
        self.chunk(&indices)
    }

    /// Batches over `0..len` in order.
    #[must_use]
    pub fn sequential(&self, len: usize) -> Vec<Vec<usize>> {
        let indices: Vec<usize> = (0..len).collect();
        self.chunk(&indices)
    }

    fn chunk(&self, indices: &[usize]) -> Vec<Vec<usize>> {
        indices
            .chunks(self.batch_size)
            .map(<[usize]>::to_vec)
            .collect()
    }
}

/// Row-major features and targets for one batch.
///
/// # Example
///
/// ```
/// use pose_dataset::{FeatureBatch, FeatureDataset, Sample};
///
/// let dataset = FeatureDataset::from_samples(vec![
///     Sample::new(vec![1.0, 2.0], true, "sit"),
///     Sample::new(vec![3.0, 4.0], false, "no_human"),
/// ])
/// .unwrap();
///
/// let batch = FeatureBatch::gather(&dataset, &[1, 0]).unwrap();
/// assert_eq!(batch.rows, 2);
/// assert_eq!(batch.features, vec![3.0, 4.0, 1.0, 2.0]);
/// assert_eq!(batch.presence, vec![0.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBatch {
    /// Flattened `[rows, width]` features.
    pub features: Vec<f32>,
    /// Presence targets, `1.0` or `0.0`.
    pub presence: Vec<f32>,
    /// Pose-class targets.
    pub poses: Vec<usize>,
    /// Number of samples.
    pub rows: usize,
    /// Feature vector length.
    pub width: usize,
}

impl FeatureBatch {
    /// Collects the samples at `indices` into one batch.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfBounds`] for an invalid index and
    /// [`DataError::EmptyDataset`] for an empty index list.
    pub fn gather(dataset: &FeatureDataset, indices: &[usize]) -> Result<Self> {
        if indices.is_empty() {
            return Err(DataError::EmptyDataset);
        }
        let width = dataset.feature_width();
        let mut batch = Self {
            features: Vec::with_capacity(indices.len() * width),
            presence: Vec::with_capacity(indices.len()),
            poses: Vec::with_capacity(indices.len()),
            rows: indices.len(),
            width,
        };
        for &index in indices {
            let sample = dataset.get(index)?;
            batch.features.extend_from_slice(sample.features);
            batch.presence.push(sample.presence);
            batch.poses.push(sample.pose);
        }
        Ok(batch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dataset::Sample;

    #[test]
    fn num_batches_rounds_up() {
        let plan = BatchPlan::new(32, Some(0));
        assert_eq!(plan.num_batches(0), 0);
        assert_eq!(plan.num_batches(32), 1);
        assert_eq!(plan.num_batches(33), 2);
    }

    #[test]
    fn zero_batch_size_is_one() {
        let plan = BatchPlan::new(0, Some(0));
        assert_eq!(plan.batch_size(), 1);
        assert_eq!(plan.sequential(3).len(), 3);
    }

    #[test]
    fn seeded_plans_repeat() {
        let mut a = BatchPlan::new(3, Some(42));
        let mut b = BatchPlan::new(3, Some(42));
        for _ in 0..3 {
            assert_eq!(a.shuffled(20), b.shuffled(20));
        }
    }

    #[test]
    fn shuffled_order_changes_between_epochs() {
        let mut plan = BatchPlan::new(100, Some(1));
        let first = plan.shuffled(50);
        let second = plan.shuffled(50);
        assert_ne!(first, second);
    }

    #[test]
    fn empty_len_has_no_batches() {
        let mut plan = BatchPlan::new(4, Some(0));
        assert!(plan.sequential(0).is_empty());
        assert!(plan.shuffled(0).is_empty());
    }

    #[test]
    fn gather_rejects_bad_indices() {
        let dataset =
            FeatureDataset::from_samples(vec![Sample::new(vec![1.0], true, "sit")]).unwrap();
        assert!(matches!(
            FeatureBatch::gather(&dataset, &[3]).unwrap_err(),
            DataError::IndexOutOfBounds { index: 3, len: 1 }
        ));
        assert!(matches!(
            FeatureBatch::gather(&dataset, &[]).unwrap_err(),
            DataError::EmptyDataset
        ));
    }
}
