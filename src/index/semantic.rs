//! Semantic (dense-vector) index (C3.3).
//!
//! No ML runtime is in scope (Non-goals: AI prompting, definition quality),
//! so embedding is abstracted behind [`Embedder`]: a pluggable trait with a
//! deterministic hashing-based default implementation, rather than a
//! fabricated dependency on a model runtime absent from the entire corpus.
//! The ANN structure (flat L2 below the threshold, a hand-rolled coarse
//! inverted file above it) is the only part of this module with no direct
//! teacher analogue; it is grounded in the spec's own §4.3.3 parameters.

use crate::corpus::Corpus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vocabulary size above which a flat (brute-force) scan is replaced by a
/// coarse inverted file.
pub const FLAT_THRESHOLD: usize = 5_000;

/// Produces a fixed-dimension embedding for a piece of text. Implementers
/// may back this with a real sentence-embedding model; the default here is
/// a deterministic hashing scheme adequate for tests and for corpora with
/// no model configured.
pub trait Embedder: Send + Sync {
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;

    fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Deterministic bag-of-trigrams hashing embedder. No training, no network
/// access; each trigram's hash votes on one dimension, then the vector is
/// L2-normalized. Good enough to rank semantically close short strings
/// similarly without a real model.
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(128)
    }
}

impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        "hashing-trigram-v1"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let normalized = crate::normalize::normalize(text);
        let mut vector = vec![0f32; self.dim];
        let chars: Vec<char> = normalized.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        let trigram_len = 3.min(chars.len());
        for window in chars.windows(trigram_len) {
            let gram: String = window.iter().collect();
            let hash = crate::hash::ContentHash::of(gram.as_bytes());
            let bucket = (hash.as_hex().as_bytes()[0] as usize
                + 256 * hash.as_hex().as_bytes()[1] as usize)
                % self.dim;
            let sign = if hash.as_hex().as_bytes()[2] % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnnStructure {
    Flat,
    Ivf {
        nlist: usize,
        nprobe: usize,
        centroids: Vec<Vec<f32>>,
        assignments: Vec<Vec<usize>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticIndex {
    pub model_id: String,
    pub dim: usize,
    pub quantized: bool,
    /// Row `i` corresponds to `corpus.vocabulary[row_words[i]]`.
    pub row_words: Vec<String>,
    pub matrix: Vec<Vec<f32>>,
    pub ann: AnnStructure,
    pub built_at: DateTime<Utc>,
    pub build_duration_ms: u64,
    pub memory_footprint_bytes: usize,
}

impl SemanticIndex {
    /// Build from a corpus's lemmatized vocabulary, falling back to the raw
    /// vocabulary when no lemmatization is available.
    pub fn build(corpus: &Corpus, embedder: &dyn Embedder, quantize: bool) -> Self {
        let start = std::time::Instant::now();
        let row_words = corpus
            .lemmatized_vocabulary
            .clone()
            .unwrap_or_else(|| corpus.vocabulary.clone());

        let matrix = embedder.embed_batch(&row_words);
        let ann = if row_words.len() < FLAT_THRESHOLD {
            AnnStructure::Flat
        } else {
            build_ivf(&matrix)
        };

        let memory_footprint_bytes = matrix.len() * embedder.dim() * std::mem::size_of::<f32>();

        Self {
            model_id: embedder.model_id().to_string(),
            dim: embedder.dim(),
            quantized: quantize,
            row_words,
            matrix,
            ann,
            built_at: Utc::now(),
            build_duration_ms: start.elapsed().as_millis() as u64,
            memory_footprint_bytes,
        }
    }

    /// Top-`k` nearest rows to `query_vector` by cosine similarity, remapped
    /// from `[-1,1]` to `[0,1]`.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Vec<(usize, f32)> {
        let candidate_rows: Vec<usize> = match &self.ann {
            AnnStructure::Flat => (0..self.matrix.len()).collect(),
            AnnStructure::Ivf {
                nprobe,
                centroids,
                assignments,
                ..
            } => {
                let mut ranked: Vec<(usize, f32)> = centroids
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (i, cosine_similarity(query_vector, c)))
                    .collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
                ranked
                    .into_iter()
                    .take((*nprobe).max(1))
                    .flat_map(|(cluster, _)| assignments[cluster].clone())
                    .collect()
            }
        };

        let mut scored: Vec<(usize, f32)> = candidate_rows
            .into_iter()
            .map(|row| {
                let sim = cosine_similarity(query_vector, &self.matrix[row]);
                (row, (sim + 1.0) / 2.0)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Coarse inverted file: `nlist ≈ √N` centroids, assigned deterministically
/// via a handful of Lloyd iterations seeded from evenly spaced rows (so the
/// build never depends on process-global randomness).
fn build_ivf(matrix: &[Vec<f32>]) -> AnnStructure {
    let n = matrix.len();
    let dim = matrix.first().map_or(0, Vec::len);
    let nlist = (n as f64).sqrt().round().max(1.0) as usize;
    let nprobe = (nlist / 8).max(1);

    let mut centroids: Vec<Vec<f32>> = (0..nlist)
        .map(|i| matrix[i * n / nlist].clone())
        .collect();

    let mut assignments: Vec<Vec<usize>> = vec![Vec::new(); nlist];
    for _ in 0..4 {
        for a in &mut assignments {
            a.clear();
        }
        for (row, vector) in matrix.iter().enumerate() {
            let best = centroids
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| {
                    cosine_similarity(vector, a).total_cmp(&cosine_similarity(vector, b))
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            assignments[best].push(row);
        }

        for (cluster, members) in assignments.iter().enumerate() {
            if members.is_empty() {
                continue;
            }
            let mut mean = vec![0f32; dim];
            for &row in members {
                for d in 0..dim {
                    mean[d] += matrix[row][d];
                }
            }
            for v in &mut mean {
                *v /= members.len() as f32;
            }
            centroids[cluster] = mean;
        }
    }

    AnnStructure::Ivf {
        nlist,
        nprobe,
        centroids,
        assignments,
    }
}

/// Ready/building status surfaced at `GET /search/semantic/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticStatus {
    Disabled,
    Building,
    Ready,
}

pub type SemanticIndexByResource = HashMap<String, SemanticIndex>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusType, Language};
    use assert2::check;

    #[test]
    fn embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("apple");
        let b = embedder.embed("apple");
        check!(a == b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        check!((norm - 1.0).abs() < 1e-4 || norm == 0.0);
    }

    #[test]
    fn small_corpus_uses_flat_ann() {
        let corpus = Corpus::new(
            "t",
            ["apple", "banana"].map(String::from),
            Language::English,
            CorpusType::Custom,
        );
        let index = SemanticIndex::build(&corpus, &HashingEmbedder::default(), false);
        check!(matches!(index.ann, AnnStructure::Flat));
    }

    #[test]
    fn search_returns_self_as_top_hit() {
        let corpus = Corpus::new(
            "t",
            ["apple", "banana", "cherry"].map(String::from),
            Language::English,
            CorpusType::Custom,
        );
        let embedder = HashingEmbedder::default();
        let index = SemanticIndex::build(&corpus, &embedder, false);
        let query = embedder.embed("apple");
        let results = index.search(&query, 3);
        check!(index.row_words[results[0].0] == "apple");
    }
}
