//! Fixed-length sequence encoding for the classifier backend.

use crate::inference::vocabulary::{VocabularyMapping, PAD_INDEX};

/// Fixed-length index sequence fed to the classifier backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence(Vec<u32>);

impl EncodedSequence {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of [`encode`]: the padded sequence plus the pre-encoding token count.
#[derive(Debug, Clone)]
pub struct Encoding {
    pub sequence: EncodedSequence,
    pub tokens_considered: usize,
}

/// Encode tokens into a sequence of exactly `max_length` indices.
///
/// Unknown tokens and indices `>= vocab_size` become the unknown index. An
/// empty token list encodes as a single unknown index so the backend never
/// sees an all-padding input. Truncation and padding are both "post": the
/// first `max_length` indices are kept and zeros are appended.
pub fn encode(
    tokens: &[String],
    vocabulary: &VocabularyMapping,
    vocab_size: usize,
    max_length: usize,
) -> Encoding {
    let unknown = vocabulary.unknown_index();

    let mut indices: Vec<u32> = tokens
        .iter()
        .map(|token| match vocabulary.get(token) {
            Some(idx) if (idx as usize) < vocab_size => idx,
            _ => unknown,
        })
        .collect();

    if indices.is_empty() {
        indices.push(unknown);
    }

    indices.truncate(max_length);
    indices.resize(max_length, PAD_INDEX);

    Encoding {
        sequence: EncodedSequence(indices),
        tokens_considered: tokens.len(),
    }
}
