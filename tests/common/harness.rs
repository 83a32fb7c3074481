//! Test harness for model artifacts and application contexts.
//!
//! Each harness owns a temporary directory holding a tiny safetensors
//! classifier and its vocabulary. Everything is cleaned up on drop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use candle_core::{Device, Tensor};
use tempfile::TempDir;

use sentiment_service::config::{ModelSettings, Settings};
use sentiment_service::inference::vocabulary::CANONICAL_FILENAME;
use sentiment_service::inference::ModelArchitecture;
use sentiment_service::init::AppContext;
use sentiment_service::services::{PredictionService, StatsTracker};

pub const VOCAB_SIZE: usize = 16;
pub const MAX_LENGTH: usize = 8;

/// Canonical word ranks; indices after the reserved offset are rank + 3.
pub const WORD_RANKS: &[(&str, u32)] = &[("the", 1), ("great", 2), ("awful", 3), ("movie", 4)];

/// Embedding row of "great" (rank 2).
pub const GREAT_INDEX: u32 = 5;
/// Embedding row of "awful" (rank 3).
pub const AWFUL_INDEX: u32 = 6;

/// Test harness that manages model artifact lifecycle.
pub struct TestHarness {
    /// Temporary directory (kept alive while harness exists)
    pub temp_dir: TempDir,
}

impl TestHarness {
    /// Empty harness: no artifact, no vocabulary.
    pub fn empty() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Harness with the polarity model and canonical vocabulary in place.
    pub fn new() -> Self {
        let harness = Self::empty();
        harness.write_polarity_model();
        harness.write_canonical_vocabulary();
        harness
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.temp_path().join("model.safetensors")
    }

    /// Write a file into the harness directory and return its path.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_path().join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    pub fn write_canonical_vocabulary(&self) -> PathBuf {
        let ranks: HashMap<&str, u32> = WORD_RANKS.iter().copied().collect();
        let json = serde_json::to_vec(&ranks).expect("Failed to serialize vocabulary");
        self.write_file(CANONICAL_FILENAME, &json)
    }

    /// Dense classifier whose logit is `2 * (#great - #awful)` over the kept tokens.
    ///
    /// Embedding dim 1: "great" embeds to +1, "awful" to -1, everything else 0.
    /// Hidden units split the sum into its positive and negative parts, the
    /// second layer is the identity and the output recombines them.
    pub fn write_polarity_model(&self) -> PathBuf {
        let device = Device::Cpu;
        let mut embedding = vec![0f32; VOCAB_SIZE];
        embedding[GREAT_INDEX as usize] = 1.0;
        embedding[AWFUL_INDEX as usize] = -1.0;

        let tensors: HashMap<String, Tensor> = [
            (
                "embedding.weight",
                Tensor::from_vec(embedding, (VOCAB_SIZE, 1), &device),
            ),
            (
                "dense_0.weight",
                Tensor::new(&[[1f32; MAX_LENGTH], [-1f32; MAX_LENGTH]], &device),
            ),
            ("dense_0.bias", Tensor::new(&[0f32, 0.0], &device)),
            (
                "dense_1.weight",
                Tensor::new(&[[1f32, 0.0], [0.0, 1.0]], &device),
            ),
            ("dense_1.bias", Tensor::new(&[0f32, 0.0], &device)),
            ("output.weight", Tensor::new(&[[2f32, -2.0]], &device)),
            ("output.bias", Tensor::new(&[0f32], &device)),
        ]
        .into_iter()
        .map(|(name, tensor)| (name.to_string(), tensor.expect("Failed to build tensor")))
        .collect();

        let path = self.artifact_path();
        candle_core::safetensors::save(&tensors, &path).expect("Failed to save artifact");
        path
    }

    /// Model settings matching the polarity model.
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            imdb_weights_path: self.artifact_path(),
            imdb_max_length: MAX_LENGTH,
            vocab_size: VOCAB_SIZE,
            architecture: ModelArchitecture::Dense {
                embedding_dim: 1,
                dense_units: 2,
            },
            ..ModelSettings::default()
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            model: self.model_settings(),
            ..Settings::default()
        }
    }

    /// Build a prediction service on the CPU.
    pub fn service(&self, settings: &ModelSettings) -> PredictionService {
        PredictionService::with_device(settings, Device::Cpu)
            .expect("Failed to build prediction service")
    }

    /// Application context backed by the polarity model.
    pub fn context(&self) -> AppContext {
        let settings = self.settings();
        let service = self.service(&settings.model);
        AppContext::from_parts(
            settings,
            Arc::new(service),
            Arc::new(StatsTracker::new(50)),
        )
    }
}

/// Application context running keyword scoring only.
pub fn heuristic_context() -> AppContext {
    AppContext::from_parts(
        Settings::default(),
        Arc::new(PredictionService::heuristic("model artifact not loaded")),
        Arc::new(StatsTracker::new(50)),
    )
}

/// Application context around an arbitrary prediction service.
pub fn context_with(service: PredictionService) -> AppContext {
    AppContext::from_parts(
        Settings::default(),
        Arc::new(service),
        Arc::new(StatsTracker::new(50)),
    )
}
