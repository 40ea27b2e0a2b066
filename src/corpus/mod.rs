//! Corpus store (C2): named vocabularies plus their derived indices, and the
//! tree of corpora that aggregates children into a master.
//!
//! The `Corpus` value here plays the role the teacher's `CrateIndex` plays in
//! `src/worker.rs` — an immutable, shareable snapshot that a mutation
//! replaces wholesale rather than edits in place. `Word`'s original/normalized
//! split is grounded directly in `types.rs::CrateName`.

mod build;
mod lemma;
mod store;

pub use store::CorpusStore;

use crate::hash::ContentHash;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use uuid::Uuid;

pub type CorpusId = Uuid;

static CORPUS_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Corpus names are used as cache keys and path segments downstream, so
/// they're restricted the same way the teacher validates crate names in
/// `cargo.rs`: letters, digits, underscore, hyphen, 1-64 characters.
pub fn validate_corpus_name(name: &str) -> crate::error::Result<()> {
    let pattern = CORPUS_NAME_PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("valid regex"));
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(crate::error::CoreError::from(
            crate::error::ValidationError::InvalidCorpusName(name.to_string()),
        ))
    }
}

/// A single vocabulary entry, carrying both forms side by side.
///
/// `original` preserves case, diacritics, and hyphenation as supplied by the
/// caller; `normalized` is the C1 output used as the matching key. Multiple
/// originals may share one normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub original: String,
    pub normalized: String,
}

impl Word {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        let normalized = crate::normalize::normalize(&original);
        Self {
            original,
            normalized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Unknown,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Spanish => "spanish",
            Self::French => "french",
            Self::German => "german",
            Self::Italian => "italian",
            Self::Portuguese => "portuguese",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "spanish" | "es" => Ok(Self::Spanish),
            "french" | "fr" => Ok(Self::French),
            "german" | "de" => Ok(Self::German),
            "italian" | "it" => Ok(Self::Italian),
            "portuguese" | "pt" => Ok(Self::Portuguese),
            "unknown" => Ok(Self::Unknown),
            other => Err(crate::error::ValidationError::UnknownLanguage(
                other.to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CorpusType {
    Language,
    Literature,
    Lexicon,
    Custom,
}

impl std::str::FromStr for CorpusType {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LANGUAGE" => Ok(Self::Language),
            "LITERATURE" => Ok(Self::Literature),
            "LEXICON" => Ok(Self::Lexicon),
            "CUSTOM" => Ok(Self::Custom),
            other => Err(crate::error::ValidationError::UnknownCorpusType(
                other.to_string(),
            )),
        }
    }
}

/// A named vocabulary plus derived indices, immutable once published.
///
/// See invariants 1-5 in the module-level data model: `vocabulary` is always
/// sorted and deduplicated, `vocabulary_to_index` is always consistent with
/// it, and every derived bucket is a full rebuild, never a patch.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub corpus_id: CorpusId,
    pub corpus_name: String,
    pub language: Language,
    pub corpus_type: CorpusType,
    pub is_master: bool,

    pub vocabulary: Vec<String>,
    pub original_vocabulary: Vec<String>,
    pub vocabulary_to_index: HashMap<String, usize>,
    pub length_buckets: HashMap<usize, HashSet<usize>>,
    pub signature_buckets: HashMap<String, HashSet<usize>>,
    pub word_frequencies: HashMap<String, u64>,

    pub lemmatized_vocabulary: Option<Vec<String>>,
    pub word_to_lemma: HashMap<String, String>,
    pub lemma_to_words: HashMap<String, HashSet<String>>,

    pub vocabulary_hash: ContentHash,
    pub parent_id: Option<CorpusId>,
    pub child_ids: Vec<CorpusId>,
    pub last_updated: DateTime<Utc>,
}

impl Corpus {
    /// Build a brand new corpus (version 1) from a raw list of original
    /// surfaces. Normalizes, dedups, sorts, and derives every index.
    pub fn new(
        corpus_name: impl Into<String>,
        originals: impl IntoIterator<Item = String>,
        language: Language,
        corpus_type: CorpusType,
    ) -> Self {
        let words: Vec<Word> = originals.into_iter().map(Word::new).collect();
        let (vocabulary, original_vocabulary, word_frequencies) = build::merge_words(&words);
        let (vocabulary_to_index, length_buckets, signature_buckets) =
            build::build_buckets(&vocabulary);
        let vocabulary_hash = build::hash_vocabulary(&vocabulary);
        let (lemmatized_vocabulary, word_to_lemma, lemma_to_words) =
            match lemma::lemmatize(&vocabulary, language) {
                Some((lv, wtl, ltw)) => (Some(lv), wtl, ltw),
                None => (None, HashMap::new(), HashMap::new()),
            };

        Self {
            corpus_id: Uuid::now_v7(),
            corpus_name: corpus_name.into(),
            language,
            corpus_type,
            is_master: false,
            vocabulary,
            original_vocabulary,
            vocabulary_to_index,
            length_buckets,
            signature_buckets,
            word_frequencies,
            lemmatized_vocabulary,
            word_to_lemma,
            lemma_to_words,
            vocabulary_hash,
            parent_id: None,
            child_ids: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn contains_normalized(&self, normalized: &str) -> bool {
        self.vocabulary_to_index.contains_key(normalized)
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Every original surface registered for a normalized form, in insertion
    /// order. Used by matchers to pick a display surface for a hit.
    pub fn originals_for(&self, normalized: &str) -> Vec<&str> {
        self.original_vocabulary
            .iter()
            .filter(|o| crate::normalize::normalize(o) == normalized)
            .map(String::as_str)
            .collect()
    }

    /// Replace the vocabulary wholesale, re-deriving every index and bumping
    /// `last_updated`. This is the single rebuild path: `add_words`,
    /// `remove_words`, and `aggregate_master` all funnel through it.
    pub(crate) fn rebuild_from_originals(&mut self, originals: Vec<String>) {
        let words: Vec<Word> = originals.into_iter().map(Word::new).collect();
        let (vocabulary, original_vocabulary, word_frequencies) = build::merge_words(&words);
        let (vocabulary_to_index, length_buckets, signature_buckets) =
            build::build_buckets(&vocabulary);
        let vocabulary_hash = build::hash_vocabulary(&vocabulary);
        let (lemmatized_vocabulary, word_to_lemma, lemma_to_words) =
            match lemma::lemmatize(&vocabulary, self.language) {
                Some((lv, wtl, ltw)) => (Some(lv), wtl, ltw),
                None => (None, HashMap::new(), HashMap::new()),
            };

        self.vocabulary = vocabulary;
        self.original_vocabulary = original_vocabulary;
        self.vocabulary_to_index = vocabulary_to_index;
        self.length_buckets = length_buckets;
        self.signature_buckets = signature_buckets;
        self.word_frequencies = word_frequencies;
        self.lemmatized_vocabulary = lemmatized_vocabulary;
        self.word_to_lemma = word_to_lemma;
        self.lemma_to_words = lemma_to_words;
        self.vocabulary_hash = vocabulary_hash;
        self.last_updated = Utc::now();
    }

    /// Debug-only sanity check of invariants 1-2; used from tests rather
    /// than on the hot path.
    #[cfg(test)]
    fn check_invariants(&self) {
        assert!(self.vocabulary.windows(2).all(|w| w[0] < w[1]));
        for (i, w) in self.vocabulary.iter().enumerate() {
            assert_eq!(self.vocabulary_to_index.get(w), Some(&i));
        }
        assert!(self.original_vocabulary.len() >= self.vocabulary.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn validate_corpus_name_rejects_empty_and_punctuation() {
        check!(validate_corpus_name("english").is_ok());
        check!(validate_corpus_name("my-corpus_2").is_ok());
        check!(validate_corpus_name("").is_err());
        check!(validate_corpus_name("has space").is_err());
        check!(validate_corpus_name(&"x".repeat(65)).is_err());
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_corpus_sorts_and_dedups() {
        let corpus = Corpus::new(
            "test",
            words(&["banana", "Apple", "apple", "cherry"]),
            Language::English,
            CorpusType::Custom,
        );
        check!(corpus.vocabulary == vec!["apple", "banana", "cherry"]);
        check!(corpus.original_vocabulary.len() == 4);
        corpus.check_invariants();
    }

    #[test]
    fn vocabulary_hash_depends_only_on_vocabulary_set() {
        let a = Corpus::new(
            "a",
            words(&["banana", "apple"]),
            Language::English,
            CorpusType::Custom,
        );
        let b = Corpus::new(
            "b",
            words(&["apple", "banana"]),
            Language::English,
            CorpusType::Custom,
        );
        check!(a.vocabulary_hash == b.vocabulary_hash);
    }

    #[test]
    fn originals_for_returns_all_surfaces_sharing_a_normalized_form() {
        let corpus = Corpus::new(
            "t",
            words(&["Apple", "APPLE", "apple"]),
            Language::English,
            CorpusType::Custom,
        );
        check!(corpus.originals_for("apple").len() == 3);
    }
}
