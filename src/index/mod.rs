//! Index builders (C3): deterministic derivation of the four artifact kinds
//! from a corpus snapshot, each identity-hashed over its inputs so corpora
//! sharing a `vocabulary_hash` share artifact records.

pub mod frequency;
pub mod semantic;
pub mod signature;
pub mod trie;
pub mod versioning;

pub use semantic::{Embedder, HashingEmbedder, SemanticIndex, SemanticStatus};
pub use trie::TrieIndex;
pub use versioning::{ArtifactChain, ArtifactRecord};

use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};

/// Which matchers a `SearchIndex` makes available. Semantic can be toggled
/// off without touching the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub exact: bool,
    pub prefix: bool,
    pub fuzzy: bool,
    pub semantic: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            exact: true,
            prefix: true,
            fuzzy: true,
            semantic: true,
        }
    }
}

/// Façade record binding a corpus version to its current index artifacts.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    pub corpus_vocabulary_hash: ContentHash,
    pub trie_hash: ContentHash,
    pub semantic_hash: Option<ContentHash>,
    pub matchers: MatcherConfig,
}

/// Content hash for an artifact: a function of the corpus's vocabulary hash,
/// the building algorithm and its version, and (for semantic artifacts) the
/// embedding model id. Two corpora with identical `vocabulary_hash` and the
/// same algorithm/model therefore get the same artifact hash and share the
/// record (dedup), as required by the data model.
pub fn artifact_hash(
    corpus_vocabulary_hash: ContentHash,
    algorithm: &str,
    algorithm_version: &str,
    model_id: Option<&str>,
) -> ContentHash {
    ContentHash::of_parts([
        corpus_vocabulary_hash.as_hex().as_str(),
        algorithm,
        algorithm_version,
        model_id.unwrap_or(""),
    ])
}
