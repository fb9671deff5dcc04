//! Dataset summary and statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::FeatureDataset;

/// Summary statistics for a labelled dataset.
///
/// # Example
///
/// ```
/// use pose_dataset::{DatasetSummary, FeatureDataset, Sample};
///
/// let dataset = FeatureDataset::from_samples(vec![
///     Sample::new(vec![0.0; 4], true, "sit"),
///     Sample::new(vec![0.0; 4], true, "sit"),
///     Sample::new(vec![0.0; 4], false, "no_human"),
/// ])
/// .unwrap();
///
/// let summary = DatasetSummary::from_dataset(&dataset);
/// assert_eq!(summary.total_samples, 3);
/// assert_eq!(summary.present_samples, 2);
/// assert_eq!(summary.class_distribution, vec![("no_human".to_string(), 1), ("sit".to_string(), 2)]);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Total number of samples.
    pub total_samples: usize,

    /// Feature vector length.
    pub feature_width: usize,

    /// Samples labelled as human present.
    pub present_samples: usize,

    /// Samples labelled as no human.
    pub absent_samples: usize,

    /// Present sample ratio (0 to 1).
    pub presence_ratio: f32,

    /// Pose name -> sample count, in vocabulary order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_distribution: Vec<(String, usize)>,
}

impl DatasetSummary {
    /// Creates a summary of a dataset.
    #[must_use]
    pub fn from_dataset(dataset: &FeatureDataset) -> Self {
        if dataset.is_empty() {
            return Self::default();
        }

        let total_samples = dataset.len();
        let present_samples = dataset.presence().iter().filter(|&&p| p).count();

        #[allow(clippy::cast_precision_loss)]
        let presence_ratio = present_samples as f32 / total_samples as f32;

        let mut counts = BTreeMap::new();
        for name in dataset.pose_names() {
            *counts.entry(name.clone()).or_insert(0) += 1;
        }

        Self {
            total_samples,
            feature_width: dataset.feature_width(),
            present_samples,
            absent_samples: total_samples - present_samples,
            presence_ratio,
            class_distribution: counts.into_iter().collect(),
        }
    }

    /// Returns true if the dataset is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_samples == 0
    }

    /// Returns the number of distinct pose classes.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.class_distribution.len()
    }

    /// Returns the count for one pose class.
    #[must_use]
    pub fn class_count(&self, pose: &str) -> usize {
        self.class_distribution
            .iter()
            .find(|(name, _)| name == pose)
            .map_or(0, |(_, count)| *count)
    }

    /// Checks if presence labels are balanced (within tolerance of 50%).
    #[must_use]
    pub fn is_balanced(&self, tolerance: f32) -> bool {
        (self.presence_ratio - 0.5).abs() <= tolerance
    }

    /// Returns a human-readable summary string.
    #[must_use]
    #[allow(clippy::let_underscore_must_use)] // String::write_fmt is infallible
    pub fn to_report(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        let _ = writeln!(report, "Dataset Summary");
        let _ = writeln!(report, "===============");
        let _ = writeln!(report, "Total samples: {}", self.total_samples);
        let _ = writeln!(report, "Feature width: {}", self.feature_width);
        let _ = writeln!(
            report,
            "Human present: {} ({:.1}%)",
            self.present_samples,
            self.presence_ratio * 100.0
        );
        let _ = writeln!(
            report,
            "No human: {} ({:.1}%)",
            self.absent_samples,
            (1.0 - self.presence_ratio) * 100.0
        );

        if !self.class_distribution.is_empty() {
            let _ = writeln!(report, "\nPose Distribution:");
            for (pose, count) in &self.class_distribution {
                let _ = writeln!(report, "  {pose}: {count}");
            }
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dataset::Sample;
    use approx::assert_relative_eq;

    fn dataset() -> FeatureDataset {
        FeatureDataset::from_samples(vec![
            Sample::new(vec![0.0, 1.0], true, "stand"),
            Sample::new(vec![0.0, 1.0], true, "sleep"),
            Sample::new(vec![0.0, 1.0], true, "stand"),
            Sample::new(vec![0.0, 1.0], false, "no_human"),
        ])
        .unwrap()
    }

    #[test]
    fn summary_counts() {
        let summary = DatasetSummary::from_dataset(&dataset());
        assert_eq!(summary.total_samples, 4);
        assert_eq!(summary.feature_width, 2);
        assert_eq!(summary.present_samples, 3);
        assert_eq!(summary.absent_samples, 1);
        assert_relative_eq!(summary.presence_ratio, 0.75);
        assert_eq!(summary.num_classes(), 3);
        assert_eq!(summary.class_count("stand"), 2);
        assert_eq!(summary.class_count("kneel"), 0);
    }

    #[test]
    fn summary_balance() {
        let summary = DatasetSummary::from_dataset(&dataset());
        assert!(!summary.is_balanced(0.1));
        assert!(summary.is_balanced(0.3));
    }

    #[test]
    fn summary_report() {
        let report = DatasetSummary::from_dataset(&dataset()).to_report();
        assert!(report.contains("Total samples: 4"));
        assert!(report.contains("stand: 2"));
    }

    #[test]
    fn summary_serialization() {
        let summary = DatasetSummary::from_dataset(&dataset());
        let json = serde_json::to_string(&summary).unwrap_or_default();
        let restored: DatasetSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, restored);
    }
}
