//! Text classification pipeline.
//!
//! tokenize → encode → backend probability, with a keyword heuristic used
//! when the model resources cannot be loaded. The [`ClassifierBackend`] trait
//! abstracts the numeric model so the prediction service can be exercised with
//! stub backends.

pub mod candle_backend;
pub mod encoder;
pub mod heuristic;
pub mod tokenizer;
pub mod vocabulary;

pub use candle_backend::{select_device, CandleClassifier, ModelArchitecture, ModelSpec};
pub use encoder::{encode, EncodedSequence, Encoding};
pub use heuristic::HeuristicClassifier;
pub use tokenizer::tokenize;
pub use vocabulary::{VocabularyMapping, VocabularySource};

/// A trained binary classifier over fixed-length index sequences.
///
/// Implementations are immutable after load and safe to share across threads.
pub trait ClassifierBackend: Send + Sync {
    /// Probability in [0, 1] that the sequence is positive.
    fn infer(&self, sequence: &EncodedSequence) -> anyhow::Result<f32>;

    /// Number of embedding rows; encoded indices must stay below this.
    fn vocab_size(&self) -> usize;

    /// Sequence length the backend expects.
    fn max_length(&self) -> usize;
}
