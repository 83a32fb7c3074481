//! Sentiment prediction service.
//!
//! Owns the loaded model resources (or the keyword fallback) and turns raw
//! text into a [`PredictionResult`]. The scoring engine is chosen once at
//! construction:
//!
//! 1. The artifact must exist, otherwise construction fails.
//! 2. Vocabulary and classifier weights are loaded together; on success the
//!    service is model-backed.
//! 3. Any loading failure is logged and the service falls back to keyword
//!    scoring, unless `strict` is set, in which case the failure is returned.

use std::sync::Arc;

use candle_core::Device;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ModelSettings;
use crate::inference::{
    encode, select_device, tokenize, CandleClassifier, ClassifierBackend, HeuristicClassifier,
    VocabularyMapping, VocabularySource,
};
use crate::models::prediction::{Label, PredictionResult};
use crate::utils::math::{probability_to_signed, round3};
use crate::SentimentError;

/// Label dead-zone half-width for model scores.
pub const MODEL_LABEL_THRESHOLD: f64 = 0.1;

/// Which scoring engine the service is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    Model,
    Heuristic,
}

impl ServiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMode::Model => "model",
            ServiceMode::Heuristic => "heuristic",
        }
    }
}

impl std::fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Engine {
    ModelBacked {
        backend: Arc<dyn ClassifierBackend>,
        vocabulary: VocabularyMapping,
    },
    Heuristic {
        classifier: HeuristicClassifier,
        reason: String,
    },
}

/// Text → sentiment scorer. Immutable after construction.
pub struct PredictionService {
    engine: Engine,
}

impl PredictionService {
    /// Build the service from settings, selecting the best available device.
    pub fn new(settings: &ModelSettings) -> Result<Self, SentimentError> {
        Self::with_device(settings, select_device())
    }

    /// Build the service from settings on an explicit device.
    pub fn with_device(settings: &ModelSettings, device: Device) -> Result<Self, SentimentError> {
        if !settings.imdb_weights_path.exists() {
            return Err(SentimentError::ArtifactNotFound(
                settings.imdb_weights_path.clone(),
            ));
        }

        match load_model_resources(settings, device) {
            Ok((backend, vocabulary)) => {
                info!(
                    "Prediction service running in model mode ({})",
                    settings.architecture.name()
                );
                Ok(Self::with_backend(Arc::new(backend), vocabulary))
            }
            Err(e) if settings.strict => Err(e),
            Err(e) => {
                warn!(
                    "Failed to load model resources: {}. Falling back to keyword scoring.",
                    e
                );
                Ok(Self::heuristic(e.to_string()))
            }
        }
    }

    /// Model-backed service over an already-loaded backend.
    pub fn with_backend(
        backend: Arc<dyn ClassifierBackend>,
        vocabulary: VocabularyMapping,
    ) -> Self {
        Self {
            engine: Engine::ModelBacked {
                backend,
                vocabulary,
            },
        }
    }

    /// Keyword-only service with the built-in keyword sets.
    pub fn heuristic(reason: impl Into<String>) -> Self {
        Self {
            engine: Engine::Heuristic {
                classifier: HeuristicClassifier::default(),
                reason: reason.into(),
            },
        }
    }

    pub fn mode(&self) -> ServiceMode {
        match &self.engine {
            Engine::ModelBacked { .. } => ServiceMode::Model,
            Engine::Heuristic { .. } => ServiceMode::Heuristic,
        }
    }

    /// Why the service fell back to keyword scoring, if it did.
    pub fn degradation_reason(&self) -> Option<&str> {
        match &self.engine {
            Engine::ModelBacked { .. } => None,
            Engine::Heuristic { reason, .. } => Some(reason),
        }
    }

    /// Score one text.
    pub fn predict(&self, text: &str) -> Result<PredictionResult, SentimentError> {
        let tokens = tokenize(text);

        let result = match &self.engine {
            Engine::ModelBacked {
                backend,
                vocabulary,
            } => {
                let encoding = encode(
                    &tokens,
                    vocabulary,
                    backend.vocab_size(),
                    backend.max_length(),
                );
                let probability = backend.infer(&encoding.sequence).map_err(|e| {
                    error!("Classifier backend failed: {:?}", e);
                    SentimentError::Inference(short_cause(&e))
                })?;

                let score = probability_to_signed(f64::from(probability));
                PredictionResult {
                    label: Label::from_score(score, MODEL_LABEL_THRESHOLD),
                    score: round3(score),
                    confidence: round3(score.abs().min(1.0)),
                    tokens_analyzed: encoding.tokens_considered,
                }
            }
            Engine::Heuristic { classifier, .. } => classifier.classify(&tokens),
        };

        debug!(
            mode = %self.mode(),
            label = %result.label,
            score = result.score,
            tokens = result.tokens_analyzed,
            "Scored text"
        );
        Ok(result)
    }

    /// Score several texts in order, stopping at the first failure.
    pub fn predict_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<PredictionResult>, SentimentError> {
        texts.iter().map(|text| self.predict(text.as_ref())).collect()
    }
}

/// First line of the root cause; candle may append a backtrace to its messages.
fn short_cause(err: &anyhow::Error) -> String {
    let cause = err.root_cause().to_string();
    cause.lines().next().unwrap_or_default().trim().to_string()
}

/// Load vocabulary and classifier weights as one unit.
fn load_model_resources(
    settings: &ModelSettings,
    device: Device,
) -> Result<(CandleClassifier, VocabularyMapping), SentimentError> {
    let source = VocabularySource::resolve(
        settings.imdb_word_index_path.as_deref(),
        &settings.canonical_vocabulary_path(),
    );
    let vocabulary = VocabularyMapping::load(&source)?;
    let backend =
        CandleClassifier::load(&settings.imdb_weights_path, settings.model_spec(), device)?;
    vocabulary.ensure_unknown_in_range(backend.vocab_size())?;
    Ok((backend, vocabulary))
}
