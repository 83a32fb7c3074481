//! Prediction output model shared by the scoring paths, HTTP API and metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentiment polarity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    /// Map a signed score onto a label with a symmetric dead-zone of `threshold`.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            Label::Positive
        } else if score <= -threshold {
            Label::Negative
        } else {
            Label::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Negative => "negative",
            Label::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    /// Signed score in [-1, 1], rounded to 3 decimals
    pub score: f64,
    /// Certainty in [0, 1], rounded to 3 decimals
    pub confidence: f64,
    /// Number of tokens the tokenizer produced
    pub tokens_analyzed: usize,
}
