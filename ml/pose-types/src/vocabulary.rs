//! Pose label vocabulary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};

/// Pose classes assumed when no fitted vocabulary travels with a model.
pub const DEFAULT_POSE_CLASSES: [&str; 5] = ["stand", "sit", "kneel", "sleep", "no_human"];

/// Label reported when a pose index cannot be decoded.
pub const UNKNOWN_POSE: &str = "unknown";

/// Bidirectional mapping between pose-class names and class indices.
///
/// Indices are assigned in sorted name order, so fitting the same set of
/// names always produces the same mapping regardless of row order. Once
/// fit, a vocabulary is never mutated; it is persisted next to the model
/// weights it was trained with.
///
/// # Example
///
/// ```
/// use pose_types::LabelVocabulary;
///
/// let vocab = LabelVocabulary::default_poses();
/// assert_eq!(vocab.classes(), ["kneel", "no_human", "sit", "sleep", "stand"]);
///
/// for name in vocab.classes() {
///     let index = vocab.encode(name).unwrap();
///     assert_eq!(vocab.decode(index).unwrap(), name);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "VocabularyFile", into = "VocabularyFile")]
pub struct LabelVocabulary {
    classes: Vec<String>,
}

impl LabelVocabulary {
    /// Fits a vocabulary from observed pose names.
    ///
    /// Duplicates are collapsed; indices follow sorted order.
    #[must_use]
    pub fn fit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        Self {
            classes: unique.into_iter().collect(),
        }
    }

    /// Returns the fallback vocabulary built from [`DEFAULT_POSE_CLASSES`].
    #[must_use]
    pub fn default_poses() -> Self {
        Self::fit(DEFAULT_POSE_CLASSES)
    }

    /// Returns a vocabulary that has never been fit.
    ///
    /// Every decode against it fails.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    /// Returns the number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if the vocabulary has no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Returns the class names in index order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns `true` if `name` is a known class.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    /// Maps a pose name to its class index.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownLabel`] if the name was not fit.
    pub fn encode(&self, name: &str) -> Result<usize> {
        self.classes
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DecodeError::unknown_label(name))
    }

    /// Maps a class index back to its pose name.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownIndex`] if the index is out of range.
    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| DecodeError::unknown_index(index, self.classes.len()))
    }

    /// Decodes an index, substituting [`UNKNOWN_POSE`] on failure.
    #[must_use]
    pub fn decode_or_unknown(&self, index: usize) -> &str {
        self.decode(index).unwrap_or(UNKNOWN_POSE)
    }
}

/// On-disk shape of a vocabulary.
#[derive(Serialize, Deserialize)]
struct VocabularyFile {
    classes: Vec<String>,
}

impl TryFrom<VocabularyFile> for LabelVocabulary {
    type Error = DecodeError;

    fn try_from(file: VocabularyFile) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for name in &file.classes {
            if name.is_empty() {
                return Err(DecodeError::invalid_vocabulary("empty class name"));
            }
            if !seen.insert(name.as_str()) {
                return Err(DecodeError::invalid_vocabulary(format!(
                    "duplicate class `{name}`"
                )));
            }
        }
        Ok(Self {
            classes: file.classes,
        })
    }
}

impl From<LabelVocabulary> for VocabularyFile {
    fn from(vocab: LabelVocabulary) -> Self {
        Self {
            classes: vocab.classes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn fit_sorts_and_dedups() {
        let vocab = LabelVocabulary::fit(["sit", "stand", "sit", "kneel", "stand"]);
        assert_eq!(vocab.classes(), ["kneel", "sit", "stand"]);
        assert_eq!(vocab.len(), 3);
    }

    #[test]
    fn fit_is_order_independent() {
        let a = LabelVocabulary::fit(["sleep", "sit", "stand"]);
        let b = LabelVocabulary::fit(["stand", "sleep", "sit"]);
        assert_eq!(a, b);
    }

    #[test]
    fn default_poses_contains_all_classes() {
        let vocab = LabelVocabulary::default_poses();
        assert_eq!(vocab.len(), DEFAULT_POSE_CLASSES.len());
        for name in DEFAULT_POSE_CLASSES {
            assert!(vocab.contains(name));
        }
    }

    #[test]
    fn round_trip_name_to_index() {
        let vocab = LabelVocabulary::fit(["stand", "sit", "kneel", "sleep", "no_human"]);
        for name in DEFAULT_POSE_CLASSES {
            let index = vocab.encode(name).unwrap();
            assert_eq!(vocab.decode(index).unwrap(), name);
        }
    }

    #[test]
    fn round_trip_index_to_name() {
        let vocab = LabelVocabulary::default_poses();
        for index in 0..vocab.len() {
            let name = vocab.decode(index).unwrap();
            assert_eq!(vocab.encode(name).unwrap(), index);
        }
    }

    #[test]
    fn encode_unknown_label() {
        let vocab = LabelVocabulary::default_poses();
        let err = vocab.encode("crawl").unwrap_err();
        assert_eq!(err, DecodeError::unknown_label("crawl"));
    }

    #[test]
    fn decode_out_of_range() {
        let vocab = LabelVocabulary::default_poses();
        let err = vocab.decode(5).unwrap_err();
        assert_eq!(err, DecodeError::unknown_index(5, 5));
    }

    #[test]
    fn empty_vocabulary_never_decodes() {
        let vocab = LabelVocabulary::empty();
        assert!(vocab.is_empty());
        assert!(vocab.decode(0).is_err());
        assert_eq!(vocab.decode_or_unknown(0), UNKNOWN_POSE);
    }

    #[test]
    fn decode_or_unknown_in_range() {
        let vocab = LabelVocabulary::fit(["sit", "stand"]);
        assert_eq!(vocab.decode_or_unknown(1), "stand");
        assert_eq!(vocab.decode_or_unknown(2), UNKNOWN_POSE);
    }

    #[test]
    fn serialization_preserves_index_order() {
        let vocab = LabelVocabulary::fit(["sit", "stand", "kneel"]);
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"{"classes":["kneel","sit","stand"]}"#);

        let parsed: LabelVocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vocab);
    }

    #[test]
    fn deserialization_rejects_duplicates() {
        let parsed = serde_json::from_str::<LabelVocabulary>(r#"{"classes":["sit","sit"]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn deserialization_rejects_empty_names() {
        let parsed = serde_json::from_str::<LabelVocabulary>(r#"{"classes":["sit",""]}"#);
        assert!(parsed.is_err());
    }
}
