//! Search engine (C4): composes the four matcher families into cascaded
//! ("smart") and single-mode queries.

pub mod matchers;
pub mod scoring;
pub mod types;

pub use types::{QueryParams, SearchMethod, SearchMode, SearchResult};

use crate::corpus::Corpus;
use crate::index::semantic::SemanticIndex;
use crate::index::trie::TrieIndex;
use crate::index::Embedder;
use std::collections::HashMap;

const EARLY_EXIT_SCORE: f32 = 0.95;

/// Everything a query needs beyond the corpus itself: the always-present
/// trie and an optional semantic index (absent until the background build
/// completes, or when semantic search is disabled).
pub struct SearchArtifacts<'a> {
    pub trie: &'a TrieIndex,
    pub semantic: Option<&'a SemanticIndex>,
    pub embedder: &'a dyn Embedder,
}

/// Outcome of a single-mode or cascade query, including the diagnostic
/// flag a caller needs to distinguish "no matches" from "semantic isn't
/// ready yet".
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub semantic_pending: bool,
}

/// Run a query against one corpus according to `params.mode`.
pub fn search(corpus: &Corpus, artifacts: &SearchArtifacts<'_>, params: &QueryParams) -> SearchOutcome {
    let limit = params.max_results as usize;
    match params.mode {
        SearchMode::Exact => SearchOutcome {
            results: matchers::exact(&params.q, corpus.language, artifacts.trie),
            semantic_pending: false,
        },
        SearchMode::Prefix => SearchOutcome {
            results: matchers::prefix(&params.q, corpus.language, artifacts.trie, limit),
            semantic_pending: false,
        },
        SearchMode::Fuzzy => SearchOutcome {
            results: matchers::fuzzy(
                &params.q,
                corpus.language,
                corpus,
                artifacts.trie,
                limit,
                params.min_score,
            ),
            semantic_pending: false,
        },
        SearchMode::Semantic => {
            let semantic_pending = artifacts.semantic.is_none();
            SearchOutcome {
                results: matchers::semantic(
                    &params.q,
                    corpus.language,
                    artifacts.embedder,
                    artifacts.semantic,
                    artifacts.trie,
                    limit,
                    params.min_score,
                ),
                semantic_pending,
            }
        }
        SearchMode::Smart => cascade(corpus, artifacts, params),
    }
}

/// Invoke matchers in fixed priority order EXACT → PREFIX → FUZZY →
/// SEMANTIC, terminating early once a higher-priority matcher satisfies the
/// limit with a score ≥ 0.95. Otherwise union, dedup by normalized form
/// (keeping the higher-priority method), and sort by priority bucket then
/// descending score.
fn cascade(corpus: &Corpus, artifacts: &SearchArtifacts<'_>, params: &QueryParams) -> SearchOutcome {
    let limit = params.max_results as usize;
    let mut collected: Vec<SearchResult> = Vec::new();
    let mut semantic_pending = false;

    let exact_hits = matchers::exact(&params.q, corpus.language, artifacts.trie);
    let satisfied_early = exact_hits.len() >= limit
        && exact_hits.iter().all(|r| r.score >= EARLY_EXIT_SCORE);
    collected.extend(exact_hits);

    if !satisfied_early {
        let prefix_hits = matchers::prefix(&params.q, corpus.language, artifacts.trie, limit);
        let prefix_satisfies = collected.len() + prefix_hits.len() >= limit
            && prefix_hits.iter().all(|r| r.score >= EARLY_EXIT_SCORE);
        collected.extend(prefix_hits);

        if !prefix_satisfies {
            let fuzzy_hits = matchers::fuzzy(
                &params.q,
                corpus.language,
                corpus,
                artifacts.trie,
                limit,
                params.min_score,
            );
            collected.extend(fuzzy_hits);

            semantic_pending = artifacts.semantic.is_none();
            let semantic_hits = matchers::semantic(
                &params.q,
                corpus.language,
                artifacts.embedder,
                artifacts.semantic,
                artifacts.trie,
                limit,
                params.min_score,
            );
            collected.extend(semantic_hits);
        }
    }

    let results = dedup_by_priority(collected, limit);
    SearchOutcome {
        results,
        semantic_pending,
    }
}

/// Deduplicate by normalized form, keeping whichever result has the
/// higher-priority (lower-numbered) method, then sort by priority bucket
/// and descending score within a bucket.
fn dedup_by_priority(results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    let mut best: HashMap<String, SearchResult> = HashMap::new();
    for result in results {
        match best.get(&result.normalized) {
            Some(existing) if existing.method.priority() <= result.method.priority() => {}
            _ => {
                best.insert(result.normalized.clone(), result);
            }
        }
    }

    let mut out: Vec<SearchResult> = best.into_values().collect();
    out.sort_by(|a, b| {
        a.method
            .priority()
            .cmp(&b.method.priority())
            .then_with(|| b.score.total_cmp(&a.score))
    });
    out.truncate(limit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusType, Language};
    use crate::index::HashingEmbedder;

    use assert2::check;

    fn corpus(words: &[&str]) -> Corpus {
        Corpus::new(
            "t",
            words.iter().map(|s| s.to_string()),
            Language::English,
            CorpusType::Custom,
        )
    }

    fn params(q: &str, mode: SearchMode) -> QueryParams {
        QueryParams {
            q: q.to_string(),
            mode,
            max_results: 20,
            min_score: 0.6,
            corpus_name: None,
            languages: Vec::new(),
        }
    }

    #[test]
    fn exact_hit_through_smart_mode() {
        let corpus = corpus(&["apple", "banana", "cherry"]);
        let trie = TrieIndex::build(&corpus);
        let embedder = HashingEmbedder::default();
        let artifacts = SearchArtifacts {
            trie: &trie,
            semantic: None,
            embedder: &embedder,
        };
        let outcome = search(&corpus, &artifacts, &params("apple", SearchMode::Smart));
        check!(outcome.results.len() == 1);
        check!(outcome.results[0].method == SearchMethod::Exact);
        check!(outcome.results[0].score == 1.0);
    }

    #[test]
    fn prefix_expansion_follows_exact_hit_in_smart_mode() {
        let corpus = corpus(&["cat", "catalog", "catastrophe", "dog"]);
        let trie = TrieIndex::build(&corpus);
        let embedder = HashingEmbedder::default();
        let artifacts = SearchArtifacts {
            trie: &trie,
            semantic: None,
            embedder: &embedder,
        };
        let outcome = search(&corpus, &artifacts, &params("cat", SearchMode::Smart));
        let methods: Vec<SearchMethod> = outcome.results.iter().map(|r| r.method).collect();
        check!(methods[0] == SearchMethod::Exact);
        check!(methods.contains(&SearchMethod::Prefix));
        let words: Vec<&str> = outcome.results.iter().map(|r| r.normalized.as_str()).collect();
        check!(words.contains(&"catalog"));
        check!(words.contains(&"catastrophe"));
    }

    #[test]
    fn methods_appear_in_non_increasing_priority_order() {
        let corpus = corpus(&["bo", "bob", "bon vivant", "vivid"]);
        let trie = TrieIndex::build(&corpus);
        let embedder = HashingEmbedder::default();
        let artifacts = SearchArtifacts {
            trie: &trie,
            semantic: None,
            embedder: &embedder,
        };
        let outcome = search(&corpus, &artifacts, &params("bob vivnt", SearchMode::Smart));
        let priorities: Vec<u8> = outcome.results.iter().map(|r| r.method.priority()).collect();
        check!(priorities.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn semantic_unavailable_reports_pending_without_failing() {
        let corpus = corpus(&["apple", "banana", "cherry"]);
        let trie = TrieIndex::build(&corpus);
        let embedder = HashingEmbedder::default();
        let artifacts = SearchArtifacts {
            trie: &trie,
            semantic: None,
            embedder: &embedder,
        };
        let outcome = search(&corpus, &artifacts, &params("fruit", SearchMode::Smart));
        check!(outcome.semantic_pending);
        check!(outcome.results.is_empty());
    }
}
