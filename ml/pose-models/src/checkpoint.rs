//! Checkpoint persistence: model weights plus the label vocabulary sidecar.

use std::fs;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::Backend;
use burn::record::{BinFileRecorder, FullPrecisionSettings, PrettyJsonFileRecorder, Recorder};
use pose_types::LabelVocabulary;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::{SequenceClassifier, SequenceClassifierConfig, SequenceClassifierRecord};
use crate::error::{ModelError, Result};

/// File name of the vocabulary written next to the weights.
pub const VOCABULARY_FILE: &str = "label_vocabulary.json";

/// Supported checkpoint file formats.
///
/// # Example
///
/// ```
/// use pose_models::CheckpointFormat;
///
/// let format = CheckpointFormat::from_extension("bin");
/// assert_eq!(format, Some(CheckpointFormat::Binary));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckpointFormat {
    /// Burn's `BinFileRecorder` with full precision.
    #[default]
    Binary,

    /// Burn's `PrettyJsonFileRecorder`, for inspection.
    Json,
}

impl CheckpointFormat {
    /// Determines format from file extension.
    ///
    /// - `.bin`, `.burn` -> Binary
    /// - `.json` -> Json
    /// - Other -> None
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "bin" | "burn" => Some(Self::Binary),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Determines format from file path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the file extension the recorder writes.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::Json => "json",
        }
    }

    /// Returns the format name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }

    /// Returns `path` with this format's extension.
    #[must_use]
    pub fn normalize(&self, path: &Path) -> PathBuf {
        path.with_extension(self.extension())
    }
}

impl std::fmt::Display for CheckpointFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Model weights paired with the vocabulary they were trained with.
#[derive(Debug, Clone)]
pub struct Checkpoint<B: Backend> {
    /// Classifier weights.
    pub model: SequenceClassifier<B>,
    /// Pose vocabulary decoded against the pose head.
    pub vocabulary: LabelVocabulary,
    /// `true` if the sidecar was missing or unreadable and the default
    /// vocabulary was substituted.
    pub default_vocabulary: bool,
}

/// Returns the sidecar vocabulary path for a weights path.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use pose_models::vocabulary_path;
///
/// assert_eq!(
///     vocabulary_path(Path::new("saved_models/best_model.bin")),
///     Path::new("saved_models/label_vocabulary.json")
/// );
/// ```
#[must_use]
pub fn vocabulary_path(weights: &Path) -> PathBuf {
    weights
        .parent()
        .map_or_else(|| PathBuf::from(VOCABULARY_FILE), |dir| dir.join(VOCABULARY_FILE))
}

/// Saves and loads [`Checkpoint`]s for one classifier architecture.
///
/// Weights and vocabulary are always written and read together. A missing
/// or unreadable vocabulary on load is not fatal: the default pose
/// vocabulary is substituted and a warning logged.
///
/// # Example
///
/// ```
/// use pose_models::{ModelStore, SequenceClassifierConfig};
///
/// let store = ModelStore::new(SequenceClassifierConfig::default());
/// assert_eq!(store.config().num_classes, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelStore {
    config: SequenceClassifierConfig,
}

impl ModelStore {
    /// Creates a store for the given architecture.
    #[must_use]
    pub const fn new(config: SequenceClassifierConfig) -> Self {
        Self { config }
    }

    /// Returns the architecture this store loads into.
    #[must_use]
    pub const fn config(&self) -> &SequenceClassifierConfig {
        &self.config
    }

    /// Writes the weights and the vocabulary sidecar.
    ///
    /// Missing parent directories are created. The weights format follows
    /// the path extension (binary unless `.json`), and the path actually
    /// written is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SaveCheckpoint`] if either file cannot be
    /// written.
    pub fn save<B: Backend>(
        &self,
        model: &SequenceClassifier<B>,
        vocabulary: &LabelVocabulary,
        path: &Path,
    ) -> Result<PathBuf> {
        let format = CheckpointFormat::from_path(path).unwrap_or_default();
        let weights = format.normalize(path);
        let shown = weights.display().to_string();

        if let Some(dir) = weights.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| ModelError::save_checkpoint(&shown, e.to_string()))?;
        }

        let saved = match format {
            CheckpointFormat::Binary => model
                .clone()
                .save_file(weights.clone(), &BinFileRecorder::<FullPrecisionSettings>::new()),
            CheckpointFormat::Json => model.clone().save_file(
                weights.clone(),
                &PrettyJsonFileRecorder::<FullPrecisionSettings>::new(),
            ),
        };
        saved.map_err(|e| ModelError::save_checkpoint(&shown, e.to_string()))?;

        write_vocabulary(&vocabulary_path(&weights), vocabulary)?;
        info!(path = %shown, format = %format, classes = vocabulary.len(), "saved checkpoint");
        Ok(weights)
    }

    /// Reads a checkpoint into a fresh classifier on `device`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::CheckpointNotFound`] if the weights file is
    /// missing, [`ModelError::LoadCheckpoint`] if it cannot be decoded, and
    /// [`ModelError::IncompatibleCheckpoint`] if its parameters do not fit
    /// the configured architecture (layer count or parameter count).
    pub fn load<B: Backend>(&self, path: &Path, device: &B::Device) -> Result<Checkpoint<B>> {
        self.config.validate()?;
        let format = CheckpointFormat::from_path(path).unwrap_or_default();
        let weights = format.normalize(path);
        let shown = weights.display().to_string();
        if !weights.is_file() {
            return Err(ModelError::checkpoint_not_found(shown));
        }

        let record: SequenceClassifierRecord<B> = match format {
            CheckpointFormat::Binary => Recorder::<B>::load(
                &BinFileRecorder::<FullPrecisionSettings>::new(),
                weights.clone(),
                device,
            ),
            CheckpointFormat::Json => Recorder::<B>::load(
                &PrettyJsonFileRecorder::<FullPrecisionSettings>::new(),
                weights.clone(),
                device,
            ),
        }
        .map_err(|e| ModelError::load_checkpoint(&shown, e.to_string()))?;

        // Layer counts must agree before the record is applied.
        if record.lstm.len() != self.config.num_layers {
            return Err(ModelError::IncompatibleCheckpoint {
                path: shown,
                expected: format!("{} LSTM layers", self.config.num_layers),
                actual: format!("{} LSTM layers", record.lstm.len()),
            });
        }

        let fresh = SequenceClassifier::<B>::new(&self.config, device);
        let expected = fresh.num_params();
        let loaded = fresh.load_record(record);
        let actual = loaded.num_params();
        if actual != expected {
            return Err(ModelError::IncompatibleCheckpoint {
                path: shown,
                expected: format!("{expected} parameters"),
                actual: format!("{actual} parameters"),
            });
        }

        let (vocabulary, default_vocabulary) = match read_vocabulary(&vocabulary_path(&weights)) {
            Ok(vocabulary) => (vocabulary, false),
            Err(reason) => {
                warn!(
                    path = %shown,
                    %reason,
                    "label vocabulary unavailable, using default pose classes"
                );
                (LabelVocabulary::default_poses(), true)
            }
        };
        if vocabulary.len() != self.config.num_classes {
            warn!(
                vocabulary = vocabulary.len(),
                num_classes = self.config.num_classes,
                "vocabulary size differs from pose head width"
            );
        }

        debug!(path = %shown, params = actual, "loaded checkpoint");
        Ok(Checkpoint {
            model: loaded,
            vocabulary,
            default_vocabulary,
        })
    }
}

fn write_vocabulary(path: &Path, vocabulary: &LabelVocabulary) -> Result<()> {
    let shown = path.display().to_string();
    let json = serde_json::to_string_pretty(vocabulary)
        .map_err(|e| ModelError::save_checkpoint(&shown, e.to_string()))?;

    // Readers never observe a partially written sidecar.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| ModelError::save_checkpoint(&shown, e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| ModelError::save_checkpoint(&shown, e.to_string()))
}

fn read_vocabulary(path: &Path) -> std::result::Result<LabelVocabulary, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let vocabulary: LabelVocabulary = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    if vocabulary.is_empty() {
        return Err("vocabulary has no classes".to_string());
    }
    Ok(vocabulary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn tiny_config() -> SequenceClassifierConfig {
        SequenceClassifierConfig::new(4)
            .with_hidden_size(3)
            .with_num_layers(1)
            .with_dense_size(3)
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            CheckpointFormat::from_extension("burn"),
            Some(CheckpointFormat::Binary)
        );
        assert_eq!(
            CheckpointFormat::from_extension("JSON"),
            Some(CheckpointFormat::Json)
        );
        assert_eq!(CheckpointFormat::from_extension("pt"), None);
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            CheckpointFormat::from_path(Path::new("/models/best_model.bin")),
            Some(CheckpointFormat::Binary)
        );
        assert_eq!(CheckpointFormat::from_path(Path::new("best_model")), None);
    }

    #[test]
    fn format_normalizes_extension() {
        assert_eq!(
            CheckpointFormat::Binary.normalize(Path::new("m/best.burn")),
            Path::new("m/best.bin")
        );
        assert_eq!(
            CheckpointFormat::Binary.normalize(Path::new("m/best")),
            Path::new("m/best.bin")
        );
    }

    #[test]
    fn format_display() {
        assert_eq!(format!("{}", CheckpointFormat::Json), "json");
        assert_eq!(CheckpointFormat::default(), CheckpointFormat::Binary);
    }

    #[test]
    fn sidecar_sits_next_to_weights() {
        assert_eq!(
            vocabulary_path(Path::new("best_model.bin")),
            Path::new(VOCABULARY_FILE)
        );
    }

    #[test]
    fn save_creates_directories_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/models/best_model.bin");
        let device = Default::default();
        let model = SequenceClassifier::<TestBackend>::new(&tiny_config(), &device);
        let vocab = LabelVocabulary::default_poses();

        let store = ModelStore::new(tiny_config());
        let written = store.save(&model, &vocab, &path).unwrap();

        assert_eq!(written, path);
        assert!(path.is_file());
        let sidecar = dir.path().join("nested/models").join(VOCABULARY_FILE);
        let restored: LabelVocabulary =
            serde_json::from_str(&fs::read_to_string(sidecar).unwrap()).unwrap();
        assert_eq!(restored, vocab);
    }

    #[test]
    fn load_missing_weights() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(tiny_config());
        let err = store
            .load::<TestBackend>(&dir.path().join("absent.bin"), &Default::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::CheckpointNotFound(_)));
    }

    #[test]
    fn load_corrupt_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model.bin");
        fs::write(&path, b"not a checkpoint").unwrap();

        let err = ModelStore::new(tiny_config())
            .load::<TestBackend>(&path, &Default::default())
            .unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn unreadable_sidecar_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model.bin");
        let device = Default::default();
        let model = SequenceClassifier::<TestBackend>::new(&tiny_config(), &device);
        let store = ModelStore::new(tiny_config());
        store
            .save(&model, &LabelVocabulary::fit(["a", "b", "c", "d", "e"]), &path)
            .unwrap();

        fs::write(dir.path().join(VOCABULARY_FILE), "{ not json").unwrap();
        let checkpoint = store.load::<TestBackend>(&path, &device).unwrap();
        assert!(checkpoint.default_vocabulary);
        assert_eq!(checkpoint.vocabulary, LabelVocabulary::default_poses());
    }

    #[test]
    fn json_format_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model.json");
        let device = Default::default();
        let model = SequenceClassifier::<TestBackend>::new(&tiny_config(), &device);
        let vocab = LabelVocabulary::fit(["sit", "stand"]);
        let store = ModelStore::new(tiny_config());

        store.save(&model, &vocab, &path).unwrap();
        let checkpoint = store.load::<TestBackend>(&path, &device).unwrap();
        assert!(!checkpoint.default_vocabulary);
        assert_eq!(checkpoint.vocabulary, vocab);
    }
}
