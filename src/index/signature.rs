//! Signature-bucket index (C3.2): candidate preselection for the fuzzy
//! matcher, so it never has to scan the full vocabulary.

use crate::corpus::Corpus;
use ahash::AHashSet;
use rapidfuzz::distance::levenshtein;
use std::collections::HashSet;

/// Above this vocabulary size, full signature-bucket enumeration is
/// replaced by frequency-weighted sampling.
pub const LARGE_CORPUS_THRESHOLD: usize = 50_000;
pub const SAMPLE_SIZE: usize = 2_000;
const SIGNATURE_EDIT_DISTANCE: usize = 2;
const LENGTH_WINDOW: usize = 2;

/// Candidate vocabulary indices for a fuzzy query: the union of all
/// signature buckets within edit distance 2 of the query's signature, plus
/// every length bucket within `[len(q)-2, len(q)+2]`.
///
/// For corpora above [`LARGE_CORPUS_THRESHOLD`], the signature-bucket union
/// is replaced by a deterministic frequency-weighted sample of
/// [`SAMPLE_SIZE`] candidates (A-Res weighted reservoir sampling, keyed off
/// each candidate's own content so repeated queries against the same
/// corpus are reproducible).
pub fn candidates(corpus: &Corpus, query_normalized: &str) -> HashSet<usize> {
    let query_signature = crate::normalize::signature(query_normalized);
    let query_len = query_normalized.chars().count();

    let mut from_signature: AHashSet<usize> = AHashSet::default();
    for (signature, indices) in &corpus.signature_buckets {
        if levenshtein::distance(query_signature.chars(), signature.chars())
            <= SIGNATURE_EDIT_DISTANCE
        {
            from_signature.extend(indices.iter().copied());
        }
    }

    let mut from_length: AHashSet<usize> = AHashSet::default();
    let lower = query_len.saturating_sub(LENGTH_WINDOW);
    let upper = query_len + LENGTH_WINDOW;
    for len in lower..=upper {
        if let Some(indices) = corpus.length_buckets.get(&len) {
            from_length.extend(indices.iter().copied());
        }
    }

    let union: AHashSet<usize> = from_signature.union(&from_length).copied().collect();

    if corpus.len() <= LARGE_CORPUS_THRESHOLD || union.len() <= SAMPLE_SIZE {
        return union.into_iter().collect();
    }

    weighted_sample(corpus, &union, SAMPLE_SIZE)
}

/// Deterministic weighted reservoir sample (algorithm A-Res), weights taken
/// from `word_frequencies`. The pseudo-random key for each candidate is
/// derived from its own content hash rather than a process-global RNG, so
/// the same corpus and candidate set always yields the same sample.
fn weighted_sample(corpus: &Corpus, pool: &AHashSet<usize>, size: usize) -> HashSet<usize> {
    let mut scored: Vec<(f64, usize)> = pool
        .iter()
        .map(|&idx| {
            let word = &corpus.vocabulary[idx];
            let weight = corpus.word_frequencies.get(word).copied().unwrap_or(1).max(1) as f64;
            let u = deterministic_unit_interval(word);
            // A-Res key: u^(1/weight), higher keys kept.
            let key = u.powf(1.0 / weight);
            (key, idx)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(size).map(|(_, idx)| idx).collect()
}

fn deterministic_unit_interval(word: &str) -> f64 {
    let hash = crate::hash::ContentHash::of(word.as_bytes());
    let bytes = hash.as_hex();
    let as_u64 = u64::from_str_radix(&bytes[..16], 16).unwrap_or(1);
    (as_u64 as f64 / u64::MAX as f64).clamp(f64::MIN_POSITIVE, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusType, Language};
    use assert2::check;

    fn corpus(words: &[&str]) -> Corpus {
        Corpus::new(
            "t",
            words.iter().map(|s| s.to_string()),
            Language::English,
            CorpusType::Custom,
        )
    }

    #[test]
    fn candidates_include_close_signature_and_length_matches() {
        let corpus = corpus(&["apple", "aple", "banana", "zzzzzzzzzzzz"]);
        let idx = candidates(&corpus, "aple");
        let words: HashSet<&str> = idx.iter().map(|&i| corpus.vocabulary[i].as_str()).collect();
        check!(words.contains("apple"));
        check!(words.contains("aple"));
        check!(!words.contains("zzzzzzzzzzzz"));
    }

    #[test]
    fn sampling_is_deterministic_across_calls() {
        let words: Vec<String> = (0..60_000).map(|i| format!("word{i}")).collect();
        let corpus = Corpus::new("big", words, Language::English, CorpusType::Custom);
        let a = candidates(&corpus, "word1");
        let b = candidates(&corpus, "word1");
        check!(a == b);
    }
}
