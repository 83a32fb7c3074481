use std::path::PathBuf;

use thiserror::Error;

/// Custom error type for sentiment-service operations.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// The trained model artifact does not exist on disk.
    #[error("Model artifact not found at {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// Vocabulary file is missing or malformed.
    #[error("Vocabulary error: {0}")]
    Vocabulary(String),

    /// Classifier backend could not be built from the artifact.
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Backend invocation failed while serving a request.
    #[error("Inference error: {0}")]
    Inference(String),

    /// Settings could not be loaded or are invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<anyhow::Error> for SentimentError {
    fn from(err: anyhow::Error) -> Self {
        SentimentError::Backend {
            message: format!("{:#}", err),
            source: Some(err.into()),
        }
    }
}
