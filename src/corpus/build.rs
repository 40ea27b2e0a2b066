//! Shared rebuild logic for `Corpus`: the single place that turns a bag of
//! originals into a sorted, deduplicated vocabulary plus its derived
//! buckets. `create`, `add_words`, `remove_words`, and `aggregate_master`
//! all funnel through this so there is exactly one rebuild path, matching
//! the "no partial-update path exists" rule in the data model.

use super::Word;
use crate::hash::ContentHash;
use crate::index::frequency;
use std::collections::{HashMap, HashSet};

/// Normalize, sort, and dedup a bag of originals into `(vocabulary,
/// original_vocabulary, word_frequencies)`.
pub(super) fn merge_words(words: &[Word]) -> (Vec<String>, Vec<String>, HashMap<String, u64>) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut vocabulary: Vec<String> = Vec::new();
    let original_vocabulary: Vec<String> = words.iter().map(|w| w.original.clone()).collect();

    for word in words {
        if seen.insert(word.normalized.as_str()) {
            vocabulary.push(word.normalized.clone());
        }
    }
    vocabulary.sort_unstable();
    vocabulary.dedup();

    let word_frequencies = vocabulary
        .iter()
        .map(|w| (w.clone(), frequency::heuristic(w)))
        .collect();

    (vocabulary, original_vocabulary, word_frequencies)
}

/// Derive `vocabulary_to_index`, `length_buckets`, and `signature_buckets`
/// from an already sorted, deduplicated vocabulary.
pub(super) fn build_buckets(
    vocabulary: &[String],
) -> (
    HashMap<String, usize>,
    HashMap<usize, HashSet<usize>>,
    HashMap<String, HashSet<usize>>,
) {
    let mut vocabulary_to_index = HashMap::with_capacity(vocabulary.len());
    let mut length_buckets: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut signature_buckets: HashMap<String, HashSet<usize>> = HashMap::new();

    for (i, w) in vocabulary.iter().enumerate() {
        vocabulary_to_index.insert(w.clone(), i);
        length_buckets.entry(w.chars().count()).or_default().insert(i);
        signature_buckets
            .entry(crate::normalize::signature(w))
            .or_default()
            .insert(i);
    }

    (vocabulary_to_index, length_buckets, signature_buckets)
}

/// Content hash over the sorted vocabulary set; stable and collision
/// resistant, independent of insertion order (the caller must pass an
/// already-sorted slice, which every rebuild path guarantees).
pub(super) fn hash_vocabulary(vocabulary: &[String]) -> ContentHash {
    ContentHash::of_parts(vocabulary.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn merge_words_dedups_by_normalized_form() {
        let words = vec![
            Word::new("Apple"),
            Word::new("apple"),
            Word::new("Banana"),
        ];
        let (vocabulary, originals, _) = merge_words(&words);
        check!(vocabulary == vec!["apple".to_string(), "banana".to_string()]);
        check!(originals.len() == 3);
    }

    #[test]
    fn build_buckets_is_internally_consistent() {
        let vocabulary = vec!["apple".to_string(), "banana".to_string()];
        let (idx, length, signature) = build_buckets(&vocabulary);
        check!(idx["apple"] == 0);
        check!(idx["banana"] == 1);
        check!(length[&5].contains(&0));
        check!(signature[&crate::normalize::signature("apple")].contains(&0));
    }
}
