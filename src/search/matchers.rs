//! The four matcher families (C4): each `(query, corpus, artifacts, limit,
//! min_score) → [SearchResult]`.

use super::scoring::correct_fuzzy_score;
use super::types::{SearchMethod, SearchResult};
use crate::corpus::{Corpus, Language};
use crate::index::semantic::SemanticIndex;
use crate::index::signature;
use crate::index::trie::TrieIndex;
use rapidfuzz::distance::levenshtein;
use rapidfuzz::fuzz;

fn pick_original(trie: &TrieIndex, normalized: &str) -> String {
    trie.originals_of(normalized)
        .first()
        .cloned()
        .unwrap_or_else(|| normalized.to_string())
}

/// Exact match: one result at `score = 1.0` if the normalized query is in
/// the vocabulary, else empty.
pub fn exact(query: &str, language: Language, trie: &TrieIndex) -> Vec<SearchResult> {
    let normalized = crate::normalize::normalize(query);
    if normalized.is_empty() || !trie.contains(&normalized) {
        return Vec::new();
    }

    vec![SearchResult {
        word: pick_original(trie, &normalized),
        normalized,
        score: 1.0,
        method: SearchMethod::Exact,
        language,
        distance: 0,
        metadata: None,
    }]
}

/// Prefix match: every vocabulary entry starting with the normalized query,
/// scored by relative length and ordered by frequency then alphabetically.
pub fn prefix(
    query: &str,
    language: Language,
    trie: &TrieIndex,
    limit: usize,
) -> Vec<SearchResult> {
    let normalized = crate::normalize::normalize(query);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<&String> = trie.prefix_range(&normalized).iter().collect();
    hits.sort_by(|a, b| {
        trie.frequency_of(b)
            .cmp(&trie.frequency_of(a))
            .then_with(|| a.cmp(b))
    });

    hits.into_iter()
        .take(limit)
        .map(|candidate| {
            let score = (normalized.chars().count() as f32 / candidate.chars().count() as f32)
                .min(1.0);
            SearchResult {
                word: pick_original(trie, candidate),
                normalized: candidate.clone(),
                score,
                method: SearchMethod::Prefix,
                language,
                distance: (candidate.chars().count() - normalized.chars().count()) as u32,
                metadata: None,
            }
        })
        .collect()
}

/// Fuzzy match: signature/length-bucket candidate preselection, a
/// token-set-aware composite similarity, and the §4.4.1 length correction.
pub fn fuzzy(
    query: &str,
    language: Language,
    corpus: &Corpus,
    trie: &TrieIndex,
    limit: usize,
    min_score: f32,
) -> Vec<SearchResult> {
    let normalized = crate::normalize::normalize(query);
    if normalized.is_empty() {
        return Vec::new();
    }

    let candidate_indices = signature::candidates(corpus, &normalized);

    let mut scored: Vec<SearchResult> = candidate_indices
        .into_iter()
        .filter_map(|idx| {
            let candidate = &corpus.vocabulary[idx];
            let base = fuzz::wratio(normalized.chars(), candidate.chars()) as f32 / 100.0;
            let corrected = correct_fuzzy_score(base, &normalized, candidate);
            if corrected < min_score {
                return None;
            }
            let distance = levenshtein::distance(normalized.chars(), candidate.chars()) as u32;
            Some(SearchResult {
                word: pick_original(trie, candidate),
                normalized: candidate.clone(),
                score: corrected,
                method: SearchMethod::Fuzzy,
                language,
                distance,
                metadata: None,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Semantic match: requires a built semantic artifact; returns empty
/// (never blocks) if one isn't ready yet.
pub fn semantic(
    query: &str,
    language: Language,
    embedder: &dyn crate::index::Embedder,
    index: Option<&SemanticIndex>,
    trie: &TrieIndex,
    limit: usize,
    min_score: f32,
) -> Vec<SearchResult> {
    let Some(index) = index else {
        return Vec::new();
    };

    let query_vector = embedder.embed(query);
    index
        .search(&query_vector, limit * 2)
        .into_iter()
        .filter(|(_, score)| *score >= min_score)
        .take(limit)
        .map(|(row, score)| {
            let normalized = index.row_words[row].clone();
            SearchResult {
                word: pick_original(trie, &normalized),
                normalized,
                score,
                method: SearchMethod::Semantic,
                language,
                distance: 0,
                metadata: None,
            }
        })
        .collect()
}
