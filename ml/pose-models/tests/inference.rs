//! Checkpoint and inference behavior against real files.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::fs;

use approx::assert_relative_eq;
use pose_models::{
    InferenceBackend, ModelError, ModelStore, Predictor, SequenceClassifier,
    SequenceClassifierConfig, VOCABULARY_FILE,
};
use pose_types::{ClassifiedError, ErrorKind, LabelVocabulary};

fn config() -> SequenceClassifierConfig {
    SequenceClassifierConfig::new(12)
        .with_hidden_size(8)
        .with_dense_size(6)
        .with_num_classes(5)
}

fn rows() -> Vec<Vec<f32>> {
    (0..6)
        .map(|r| (0..12).map(|c| ((r * 12 + c) as f32 * 0.37).sin()).collect())
        .collect()
}

fn saved_checkpoint(dir: &std::path::Path, vocabulary: &LabelVocabulary) -> std::path::PathBuf {
    let device = Default::default();
    let model = SequenceClassifier::<InferenceBackend>::new(&config(), &device);
    ModelStore::new(config())
        .save(&model, vocabulary, &dir.join("best_model.bin"))
        .unwrap()
}

#[test]
fn checkpoint_round_trip_reproduces_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let device = Default::default();
    let model = SequenceClassifier::<InferenceBackend>::new(&config(), &device);
    let vocabulary = LabelVocabulary::default_poses();
    let path = ModelStore::new(config())
        .save(&model, &vocabulary, &dir.path().join("best_model.bin"))
        .unwrap();

    let before = Predictor::new(model, vocabulary.clone(), device).predict(&rows()).unwrap();
    let restored = Predictor::<InferenceBackend>::from_checkpoint(&path, config(), device).unwrap();
    let after = restored.predict(&rows()).unwrap();

    assert_eq!(restored.vocabulary(), &vocabulary);
    assert_eq!(before, after);
}

#[test]
fn batch_and_single_predictions_agree() {
    let dir = tempfile::tempdir().unwrap();
    let path = saved_checkpoint(dir.path(), &LabelVocabulary::default_poses());
    let predictor =
        Predictor::<InferenceBackend>::from_checkpoint(&path, config(), Default::default())
            .unwrap();

    let batch = predictor.predict(&rows()).unwrap();
    for (i, row) in rows().iter().enumerate() {
        let single = predictor.predict_one(row).unwrap();
        let batched = batch.get(i).unwrap();
        assert_relative_eq!(
            single.presence_probability,
            batched.presence_probability,
            epsilon = 1e-5
        );
        assert_eq!(single.presence, batched.presence);
        assert_eq!(single.pose, batched.pose);
    }
}

#[test]
fn missing_sidecar_uses_default_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    let custom = LabelVocabulary::fit(["crouch", "jump", "lie", "run", "walk"]);
    let path = saved_checkpoint(dir.path(), &custom);
    fs::remove_file(dir.path().join(VOCABULARY_FILE)).unwrap();

    let predictor =
        Predictor::<InferenceBackend>::from_checkpoint(&path, config(), Default::default())
            .unwrap();
    assert_eq!(predictor.vocabulary(), &LabelVocabulary::default_poses());

    let predictions = predictor.predict(&rows()).unwrap();
    for pose in &predictions.pose {
        assert!(LabelVocabulary::default_poses().contains(pose), "pose {pose}");
    }
}

#[test]
fn shape_violation_produces_no_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let path = saved_checkpoint(dir.path(), &LabelVocabulary::default_poses());
    let predictor =
        Predictor::<InferenceBackend>::from_checkpoint(&path, config(), Default::default())
            .unwrap();

    let err = predictor.predict_one(&[0.0; 11]).unwrap_err();
    assert!(matches!(err, ModelError::Shape { .. }));
    assert_eq!(err.kind(), ErrorKind::Shape);
    assert_eq!(err.kind().status_code(), 422);
}

#[test]
fn missing_weights_is_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Predictor::<InferenceBackend>::from_checkpoint(
        dir.path().join("best_model.bin"),
        config(),
        Default::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn layer_count_mismatch_is_persistence_error() {
    for (saved, wanted) in [(2, 1), (1, 2)] {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model =
            SequenceClassifier::<InferenceBackend>::new(&config().with_num_layers(saved), &device);
        let path = ModelStore::new(config().with_num_layers(saved))
            .save(&model, &LabelVocabulary::default_poses(), &dir.path().join("best_model.bin"))
            .unwrap();

        let err = ModelStore::new(config().with_num_layers(wanted))
            .load::<InferenceBackend>(&path, &device)
            .unwrap_err();
        assert!(matches!(err, ModelError::IncompatibleCheckpoint { .. }), "{err}");
        assert!(err.to_string().contains(&format!("expected {wanted} LSTM layers")));
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }
}

#[test]
fn hidden_size_mismatch_is_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = saved_checkpoint(dir.path(), &LabelVocabulary::default_poses());

    let err = ModelStore::new(config().with_hidden_size(10))
        .load::<InferenceBackend>(&path, &Default::default())
        .unwrap_err();
    assert!(matches!(err, ModelError::IncompatibleCheckpoint { .. }), "{err}");
    assert_eq!(err.kind().status_code(), 503);
}

#[test]
fn unwritable_directory_fails_save() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("saved_models");
    fs::write(&blocker, "a file, not a directory").unwrap();

    let device = Default::default();
    let model = SequenceClassifier::<InferenceBackend>::new(&config(), &device);
    let err = ModelStore::new(config())
        .save(&model, &LabelVocabulary::default_poses(), &blocker.join("best_model.bin"))
        .unwrap_err();
    assert!(matches!(err, ModelError::SaveCheckpoint { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(!dir.path().join(VOCABULARY_FILE).exists());
}
