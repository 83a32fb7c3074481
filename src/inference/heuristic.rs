//! Keyword-matching scorer used when model resources are unavailable.

use std::collections::HashSet;

use crate::models::prediction::{Label, PredictionResult};
use crate::utils::math::round3;
use crate::SentimentError;

/// Label dead-zone half-width for keyword scores.
///
/// Wider than the model path's 0.1: keyword ratios move in coarse steps.
pub const HEURISTIC_LABEL_THRESHOLD: f64 = 0.15;

/// Inputs with fewer tokens than this get [`SHORT_TEXT_PENALTY`] applied.
pub const SHORT_TEXT_TOKENS: usize = 4;

/// Confidence multiplier for short inputs.
pub const SHORT_TEXT_PENALTY: f64 = 0.6;

const POSITIVE_KEYWORDS: &[&str] = &[
    "amazing",
    "awesome",
    "beautiful",
    "best",
    "brilliant",
    "delightful",
    "enjoy",
    "enjoyed",
    "excellent",
    "fantastic",
    "good",
    "great",
    "happy",
    "like",
    "liked",
    "love",
    "loved",
    "nice",
    "perfect",
    "superb",
    "wonderful",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "annoying",
    "awful",
    "bad",
    "boring",
    "disappointed",
    "disappointing",
    "dull",
    "hate",
    "hated",
    "horrible",
    "mediocre",
    "poor",
    "sad",
    "stupid",
    "terrible",
    "ugly",
    "waste",
    "worse",
    "worst",
];

/// Per-input keyword tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordCounts {
    pub positive: usize,
    pub negative: usize,
}

impl KeywordCounts {
    /// Net polarity in [-1, 1]; zero when no keywords matched.
    pub fn raw_score(&self) -> f64 {
        let matched = self.positive + self.negative;
        if matched == 0 {
            return 0.0;
        }
        (self.positive as f64 - self.negative as f64) / matched.max(1) as f64
    }
}

/// Keyword scorer over two disjoint, lowercase keyword sets.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self {
            positive: POSITIVE_KEYWORDS.iter().map(|w| w.to_string()).collect(),
            negative: NEGATIVE_KEYWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl HeuristicClassifier {
    /// Build a scorer from custom keyword sets.
    ///
    /// Keywords are lowercased. A keyword present in both sets is rejected.
    pub fn new<P, N>(positive: P, negative: N) -> Result<Self, SentimentError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let positive: HashSet<String> = positive
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        let negative: HashSet<String> = negative
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();

        let mut overlap: Vec<&String> = positive.intersection(&negative).collect();
        if !overlap.is_empty() {
            overlap.sort();
            return Err(SentimentError::Validation(format!(
                "keywords present in both positive and negative sets: {:?}",
                overlap
            )));
        }

        Ok(Self { positive, negative })
    }

    /// Count keyword hits among `tokens`.
    pub fn count(&self, tokens: &[String]) -> KeywordCounts {
        tokens.iter().fold(
            KeywordCounts {
                positive: 0,
                negative: 0,
            },
            |mut counts, token| {
                if self.positive.contains(token) {
                    counts.positive += 1;
                } else if self.negative.contains(token) {
                    counts.negative += 1;
                }
                counts
            },
        )
    }

    /// Score already-tokenized text.
    pub fn classify(&self, tokens: &[String]) -> PredictionResult {
        let raw = self.count(tokens).raw_score();

        let mut confidence = raw.abs().min(1.0);
        if tokens.len() < SHORT_TEXT_TOKENS {
            confidence *= SHORT_TEXT_PENALTY;
        }

        PredictionResult {
            label: Label::from_score(raw, HEURISTIC_LABEL_THRESHOLD),
            score: round3(raw),
            confidence: round3(confidence),
            tokens_analyzed: tokens.len(),
        }
    }
}
