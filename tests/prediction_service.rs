//! Prediction service against real safetensors artifacts.
//!
//! Covers model-mode scoring end to end, vocabulary source selection and
//! every degradation path at construction time.

mod common;

use std::path::PathBuf;

use common::harness::{TestHarness, AWFUL_INDEX, MAX_LENGTH};
use pretty_assertions::assert_eq;
use sentiment_service::models::Label;
use sentiment_service::services::{PredictionService, ServiceMode};
use sentiment_service::SentimentError;

use candle_core::Device;

// =============================================================================
// MODEL MODE
// =============================================================================

#[test]
fn model_mode_scores_positive_text() {
    let harness = TestHarness::new();
    let service = harness.service(&harness.model_settings());
    assert_eq!(service.mode(), ServiceMode::Model);
    assert!(service.degradation_reason().is_none());

    // logit 2 -> p = 0.8808 -> score 0.7616
    let result = service.predict("What a great movie").unwrap();
    assert_eq!(result.label, Label::Positive);
    assert_eq!(result.score, 0.762);
    assert_eq!(result.confidence, 0.762);
    assert_eq!(result.tokens_analyzed, 4);
}

#[test]
fn model_mode_scores_negative_text() {
    let harness = TestHarness::new();
    let service = harness.service(&harness.model_settings());

    // logit -4 -> p = 0.0180 -> score -0.9640
    let result = service.predict("Awful, AWFUL movie.").unwrap();
    assert_eq!(result.label, Label::Negative);
    assert_eq!(result.score, -0.964);
    assert_eq!(result.confidence, 0.964);
    assert_eq!(result.tokens_analyzed, 3);
}

#[test]
fn model_mode_neutral_without_signal_words() {
    let harness = TestHarness::new();
    let service = harness.service(&harness.model_settings());

    let result = service.predict("the movie, the popcorn and the seats").unwrap();
    assert_eq!(result.label, Label::Neutral);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn model_mode_no_letter_tokens() {
    let harness = TestHarness::new();
    let service = harness.service(&harness.model_settings());

    let result = service.predict("12345 !!!").unwrap();
    assert_eq!(result.tokens_analyzed, 0);
    assert_eq!(result.label, Label::Neutral);
}

#[test]
fn model_mode_truncates_long_input() {
    let harness = TestHarness::new();
    let service = harness.service(&harness.model_settings());

    // Only the first MAX_LENGTH tokens reach the model; the trailing "awful"s are cut.
    let mut words = vec!["great"; MAX_LENGTH];
    words.extend(["awful"; 4]);
    let result = service.predict(&words.join(" ")).unwrap();

    assert_eq!(result.tokens_analyzed, MAX_LENGTH + 4);
    assert_eq!(result.label, Label::Positive);
    assert_eq!(result.score, 1.0);
}

#[test]
fn model_mode_batch_preserves_order() {
    let harness = TestHarness::new();
    let service = harness.service(&harness.model_settings());

    let results = service
        .predict_batch(&["great", "awful", "the movie"])
        .unwrap();
    let labels: Vec<Label> = results.iter().map(|r| r.label).collect();
    assert_eq!(labels, vec![Label::Positive, Label::Negative, Label::Neutral]);
}

// =============================================================================
// VOCABULARY SOURCES
// =============================================================================

#[test]
fn override_vocabulary_is_used_verbatim() {
    let harness = TestHarness::new();
    // Map "great" onto the negative embedding row
    let custom = harness.write_file(
        "custom_index.json",
        format!(r#"{{"great": {}, "UNK": 2}}"#, AWFUL_INDEX).as_bytes(),
    );
    let settings = sentiment_service::config::ModelSettings {
        imdb_word_index_path: Some(custom),
        ..harness.model_settings()
    };
    let service = harness.service(&settings);

    let result = service.predict("great").unwrap();
    assert_eq!(result.label, Label::Negative);
}

#[test]
fn out_of_range_override_index_becomes_unknown() {
    let harness = TestHarness::new();
    let custom = harness.write_file("custom_index.json", br#"{"great": 40, "UNK": 2}"#);
    let settings = sentiment_service::config::ModelSettings {
        imdb_word_index_path: Some(custom),
        ..harness.model_settings()
    };
    let service = harness.service(&settings);

    // Index 40 is beyond the 16-row embedding, so it is looked up as UNK
    let result = service.predict("great great").unwrap();
    assert_eq!(result.label, Label::Neutral);
    assert_eq!(result.tokens_analyzed, 2);
}

#[test]
fn out_of_range_unknown_index_degrades() {
    let harness = TestHarness::new();
    let custom = harness.write_file("custom_index.json", br#"{"great": 5, "UNK": 40}"#);
    let settings = sentiment_service::config::ModelSettings {
        imdb_word_index_path: Some(custom),
        ..harness.model_settings()
    };
    let service = harness.service(&settings);

    assert_eq!(service.mode(), ServiceMode::Heuristic);
    assert!(service.degradation_reason().unwrap().contains("unknown index 40"));
    assert!(service.predict("a great film").is_ok());
}

#[test]
fn out_of_range_unknown_index_fails_strict() {
    let harness = TestHarness::new();
    let custom = harness.write_file("custom_index.json", br#"{"great": 5, "UNK": 40}"#);
    let settings = sentiment_service::config::ModelSettings {
        imdb_word_index_path: Some(custom),
        strict: true,
        ..harness.model_settings()
    };

    let result = PredictionService::with_device(&settings, Device::Cpu);
    assert!(matches!(result, Err(SentimentError::Vocabulary(_))));
}

#[test]
fn missing_override_falls_back_to_canonical() {
    let harness = TestHarness::new();
    let settings = sentiment_service::config::ModelSettings {
        imdb_word_index_path: Some(harness.temp_path().join("nope.json")),
        ..harness.model_settings()
    };
    let service = harness.service(&settings);

    assert_eq!(service.mode(), ServiceMode::Model);
    assert_eq!(service.predict("great").unwrap().label, Label::Positive);
}

#[test]
fn explicit_canonical_path() {
    let harness = TestHarness::empty();
    harness.write_polarity_model();
    let ranks = harness.write_file("ranks.json", br#"{"great": 2}"#);
    let settings = sentiment_service::config::ModelSettings {
        canonical_word_index_path: Some(ranks),
        ..harness.model_settings()
    };
    let service = harness.service(&settings);

    assert_eq!(service.mode(), ServiceMode::Model);
    assert_eq!(service.predict("great").unwrap().label, Label::Positive);
}

// =============================================================================
// DEGRADATION
// =============================================================================

#[test]
fn missing_artifact_is_fatal() {
    let harness = TestHarness::empty();
    harness.write_canonical_vocabulary();

    let result = PredictionService::with_device(&harness.model_settings(), Device::Cpu);
    match result {
        Err(SentimentError::ArtifactNotFound(path)) => assert_eq!(path, harness.artifact_path()),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected ArtifactNotFound"),
    }
}

#[test]
fn missing_vocabulary_degrades_to_heuristic() {
    let harness = TestHarness::empty();
    harness.write_polarity_model();

    let service = harness.service(&harness.model_settings());
    assert_eq!(service.mode(), ServiceMode::Heuristic);
    assert!(service
        .degradation_reason()
        .is_some_and(|reason| reason.contains("imdb_word_index.json")));

    // Keyword scoring with the short-text penalty
    let result = service.predict("great movie").unwrap();
    assert_eq!(result.label, Label::Positive);
    assert_eq!(result.score, 1.0);
    assert_eq!(result.confidence, 0.6);
}

#[test]
fn malformed_vocabulary_degrades_to_heuristic() {
    let harness = TestHarness::new();
    harness.write_file("imdb_word_index.json", b"[not, a, map]");

    let service = harness.service(&harness.model_settings());
    assert_eq!(service.mode(), ServiceMode::Heuristic);
}

#[test]
fn corrupt_weights_degrade_to_heuristic() {
    let harness = TestHarness::new();
    harness.write_file("model.safetensors", b"definitely not safetensors");

    let service = harness.service(&harness.model_settings());
    assert_eq!(service.mode(), ServiceMode::Heuristic);
}

#[test]
fn incompatible_shape_degrades_to_heuristic() {
    let harness = TestHarness::new();
    let settings = sentiment_service::config::ModelSettings {
        imdb_max_length: MAX_LENGTH * 2,
        ..harness.model_settings()
    };

    let service = harness.service(&settings);
    assert_eq!(service.mode(), ServiceMode::Heuristic);
}

#[test]
fn strict_mode_surfaces_load_failure() {
    let harness = TestHarness::new();
    harness.write_file("model.safetensors", b"definitely not safetensors");
    let settings = sentiment_service::config::ModelSettings {
        strict: true,
        ..harness.model_settings()
    };

    let result = PredictionService::with_device(&settings, Device::Cpu);
    assert!(matches!(result, Err(SentimentError::Backend { .. })));
}

#[test]
fn strict_mode_surfaces_vocabulary_failure() {
    let harness = TestHarness::empty();
    harness.write_polarity_model();
    let settings = sentiment_service::config::ModelSettings {
        strict: true,
        ..harness.model_settings()
    };

    let result = PredictionService::with_device(&settings, Device::Cpu);
    assert!(matches!(result, Err(SentimentError::Vocabulary(_))));
}

#[test]
fn default_artifact_path_is_relative() {
    let settings = sentiment_service::config::ModelSettings::default();
    assert_eq!(
        settings.imdb_weights_path,
        PathBuf::from("artifacts/imdb_dense/model.safetensors")
    );
}

// =============================================================================
// ARBITRARY INPUT
// =============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use sentiment_service::inference::tokenize;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn model_mode_accepts_any_text(text in "\\PC*") {
            let harness = TestHarness::new();
            let service = harness.service(&harness.model_settings());
            let result = service.predict(&text);
            prop_assert!(result.is_ok());
            let result = result.unwrap();
            prop_assert!((0.0..=1.0).contains(&result.confidence));
            prop_assert_eq!(result.tokens_analyzed, tokenize(&text).len());
        }
    }
}
