//! Token → index mapping defining the classifier's input alphabet.
//!
//! Two sources are supported:
//! - the canonical word-rank list published with the IMDB dataset
//!   (`{"the": 1, "and": 2, ...}`), shifted by [`INDEX_FROM`] so the reserved
//!   `PAD`/`START`/`UNK` entries occupy indices 0..3;
//! - an override file mapping tokens directly to indices, used verbatim.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::SentimentError;

/// Reserved padding index.
pub const PAD_INDEX: u32 = 0;
/// Reserved start-of-sequence index.
pub const START_INDEX: u32 = 1;
/// Reserved out-of-vocabulary index.
pub const UNK_INDEX: u32 = 2;
/// Offset applied to canonical word ranks.
pub const INDEX_FROM: u32 = 3;

/// Default filename of the canonical word-rank list, looked up next to the artifact.
pub const CANONICAL_FILENAME: &str = "imdb_word_index.json";

/// Where a vocabulary should be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabularySource {
    /// Canonical word-rank list at the given path.
    Canonical(PathBuf),
    /// Override token → index file used verbatim.
    Override(PathBuf),
}

impl VocabularySource {
    /// Pick the source: the override when given and present on disk,
    /// otherwise the canonical list.
    pub fn resolve(override_path: Option<&Path>, canonical_path: &Path) -> Self {
        match override_path {
            Some(path) if path.exists() => Self::Override(path.to_path_buf()),
            Some(path) => {
                tracing::warn!(
                    "Vocabulary override {} does not exist, using canonical list",
                    path.display()
                );
                Self::Canonical(canonical_path.to_path_buf())
            }
            None => Self::Canonical(canonical_path.to_path_buf()),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Canonical(path) | Self::Override(path) => path,
        }
    }
}

/// Immutable token → index mapping with a reserved unknown index.
#[derive(Debug, Clone)]
pub struct VocabularyMapping {
    index: HashMap<String, u32>,
    unknown_index: u32,
}

impl VocabularyMapping {
    /// Build from canonical word ranks (1-based), applying the reserved offset.
    pub fn from_word_ranks(ranks: HashMap<String, u32>) -> Result<Self, SentimentError> {
        let mut index: HashMap<String, u32> = ranks
            .into_iter()
            .map(|(word, rank)| (word, rank.saturating_add(INDEX_FROM)))
            .collect();
        index.insert("PAD".to_string(), PAD_INDEX);
        index.insert("START".to_string(), START_INDEX);
        index.insert("UNK".to_string(), UNK_INDEX);

        Self::from_index(index)
    }

    /// Build from an explicit token → index table.
    ///
    /// The unknown index is the `UNK` entry when present, otherwise
    /// [`UNK_INDEX`]. Fails if two tokens share an index.
    pub fn from_index(index: HashMap<String, u32>) -> Result<Self, SentimentError> {
        let mut seen = HashSet::with_capacity(index.len());
        for (token, &idx) in &index {
            if !seen.insert(idx) {
                return Err(SentimentError::Vocabulary(format!(
                    "index {} is assigned to more than one token (including '{}')",
                    idx, token
                )));
            }
        }

        let unknown_index = index.get("UNK").copied().unwrap_or(UNK_INDEX);
        Ok(Self {
            index,
            unknown_index,
        })
    }

    /// Load the mapping from `source`.
    pub fn load(source: &VocabularySource) -> Result<Self, SentimentError> {
        let path = source.path();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SentimentError::Vocabulary(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let table: HashMap<String, u32> = serde_json::from_str(&raw).map_err(|e| {
            SentimentError::Vocabulary(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        let mapping = match source {
            VocabularySource::Canonical(_) => Self::from_word_ranks(table)?,
            VocabularySource::Override(_) => Self::from_index(table)?,
        };
        tracing::info!(
            "Loaded vocabulary from {} ({} tokens)",
            path.display(),
            mapping.len()
        );
        Ok(mapping)
    }

    /// Fail if the unknown index cannot be embedded by a model with `vocab_size` rows.
    pub fn ensure_unknown_in_range(&self, vocab_size: usize) -> Result<(), SentimentError> {
        if self.unknown_index as usize >= vocab_size {
            return Err(SentimentError::Vocabulary(format!(
                "unknown index {} is outside the model vocabulary of {} rows",
                self.unknown_index, vocab_size
            )));
        }
        Ok(())
    }

    /// Look up a token's index.
    pub fn get(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    pub fn unknown_index(&self) -> u32 {
        self.unknown_index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
