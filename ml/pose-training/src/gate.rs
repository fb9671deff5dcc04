//! Checkpoint-improvement gating.

use std::path::{Path, PathBuf};

use burn::prelude::Backend;
use pose_models::{ModelStore, SequenceClassifier};
use pose_types::LabelVocabulary;

use crate::error::Result;

/// Decides which epochs are worth persisting.
///
/// Starts with a best loss of `+inf`; a loss passes only if it is strictly
/// lower than the best seen so far. `NaN` never passes.
///
/// # Example
///
/// ```
/// use pose_training::CheckpointGate;
///
/// let mut gate = CheckpointGate::new();
/// let saved: Vec<bool> = [5.0, 3.0, 4.0, 2.0, 6.0]
///     .into_iter()
///     .map(|loss| gate.observe(loss))
///     .collect();
///
/// assert_eq!(saved, vec![true, true, false, true, false]);
/// assert_eq!(gate.saves(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckpointGate {
    best: f32,
    saves: usize,
}

impl Default for CheckpointGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointGate {
    /// Creates a gate that has seen nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            best: f32::INFINITY,
            saves: 0,
        }
    }

    /// Records a validation loss; returns `true` if it is a new best.
    pub fn observe(&mut self, loss: f32) -> bool {
        if loss < self.best {
            self.best = loss;
            self.saves += 1;
            true
        } else {
            false
        }
    }

    /// Returns the best loss seen, `+inf` before any improvement.
    #[must_use]
    pub const fn best(&self) -> f32 {
        self.best
    }

    /// Returns how many losses passed the gate.
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

/// Destination for checkpoints that pass the gate.
pub trait CheckpointSink<B: Backend> {
    /// Persists a model and its vocabulary, returning the path written.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be written.
    fn persist(
        &mut self,
        model: &SequenceClassifier<B>,
        vocabulary: &LabelVocabulary,
        path: &Path,
    ) -> Result<PathBuf>;
}

impl<B: Backend> CheckpointSink<B> for ModelStore {
    fn persist(
        &mut self,
        model: &SequenceClassifier<B>,
        vocabulary: &LabelVocabulary,
        path: &Path,
    ) -> Result<PathBuf> {
        Ok(self.save(model, vocabulary, path)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn gate_saves_only_on_strict_improvement() {
        let mut gate = CheckpointGate::new();
        let losses = [5.0, 3.0, 4.0, 2.0, 6.0];
        let saved: Vec<f32> = losses.into_iter().filter(|&l| gate.observe(l)).collect();

        assert_eq!(saved, vec![5.0, 3.0, 2.0]);
        assert_eq!(gate.saves(), 3);
        assert!((gate.best() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn gate_rejects_equal_loss() {
        let mut gate = CheckpointGate::new();
        assert!(gate.observe(1.0));
        assert!(!gate.observe(1.0));
        assert_eq!(gate.saves(), 1);
    }

    #[test]
    fn gate_rejects_nan() {
        let mut gate = CheckpointGate::new();
        assert!(!gate.observe(f32::NAN));
        assert!(gate.best().is_infinite());
        assert!(gate.observe(0.5));
        assert!(!gate.observe(f32::NAN));
    }

    #[test]
    fn gate_first_finite_loss_always_passes() {
        let mut gate = CheckpointGate::default();
        assert!(gate.observe(1e30));
        assert_eq!(gate.saves(), 1);
    }

    #[test]
    fn gate_never_improving() {
        let mut gate = CheckpointGate::new();
        gate.observe(0.1);
        for loss in [0.2, 0.3, 0.4] {
            assert!(!gate.observe(loss));
        }
        assert_eq!(gate.saves(), 1);
    }
}
