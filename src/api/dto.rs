//! Request/response DTOs for the REST surface (§6). `utoipa::ToSchema`
//! derives mirror the pattern used for the thesaurus widget in this pack's
//! sibling search-engine example.

use crate::corpus::{CorpusId, CorpusType, Language};
use crate::search::{SearchMethod, SearchMode};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub mode: Option<String>,
    pub max_results: Option<u32>,
    pub min_score: Option<f32>,
    pub corpus_name: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResultDto {
    pub word: String,
    pub normalized: String,
    pub score: f32,
    pub method: SearchMethod,
    pub language: String,
    pub distance: u32,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResultDto>,
    pub total_found: usize,
    pub languages: Vec<String>,
    pub mode: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCorpusRequest {
    pub name: String,
    pub language: String,
    pub source_type: String,
    pub vocabulary: Vec<String>,
    #[serde(default)]
    pub enable_semantic: bool,
    pub ttl_hours: Option<u64>,
    /// Marks this corpus a master whose vocabulary is thereafter owned by
    /// aggregation from its children rather than its own `vocabulary` field.
    #[serde(default)]
    pub is_master: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CorpusDescriptor {
    pub corpus_id: CorpusId,
    pub corpus_name: String,
    pub language: String,
    pub corpus_type: String,
    pub is_master: bool,
    pub vocabulary_size: usize,
    pub vocabulary_hash: String,
    pub parent_id: Option<CorpusId>,
    pub child_ids: Vec<CorpusId>,
}

impl CorpusDescriptor {
    pub fn from_corpus(corpus: &crate::corpus::Corpus) -> Self {
        Self {
            corpus_id: corpus.corpus_id,
            corpus_name: corpus.corpus_name.clone(),
            language: corpus.language.as_str().to_string(),
            corpus_type: format!("{:?}", corpus.corpus_type).to_uppercase(),
            is_master: corpus.is_master,
            vocabulary_size: corpus.len(),
            vocabulary_hash: corpus.vocabulary_hash.to_string(),
            parent_id: corpus.parent_id,
            child_ids: corpus.child_ids.clone(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteCorpusQuery {
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub search_engine: String,
    pub database: String,
    pub uptime_seconds: u64,
    pub cache_hit_rate: f64,
    pub connection_pool: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SemanticStatusResponse {
    pub enabled: bool,
    pub ready: bool,
    pub building: bool,
    pub message: String,
}

pub fn parse_language_list(raw: Option<&str>) -> Vec<Language> {
    raw.map(|s| {
        s.split(',')
            .filter_map(|part| part.trim().parse::<Language>().ok())
            .collect()
    })
    .unwrap_or_default()
}

pub fn parse_corpus_type(raw: &str) -> crate::error::Result<CorpusType> {
    raw.parse()
}
