//! Shared application state, constructed once at start-up and threaded
//! through every handler via axum's `State` extractor — the explicit
//! context-object pattern the redesign notes call for in place of the
//! original's module-level singletons.

use crate::cache::CacheManager;
use crate::config::AppConfig;
use crate::corpus::{CorpusId, CorpusStore};
use crate::index::semantic::SemanticIndex;
use crate::index::versioning::ArtifactChain;
use crate::index::{Embedder, SearchIndex, TrieIndex};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Uninitialized,
    Initializing,
    Ready,
    Error,
}

impl EngineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub corpus_store: Arc<CorpusStore>,
    pub cache: Arc<CacheManager>,
    pub embedder: Arc<dyn Embedder>,
    /// One semantic index per corpus, populated by the background warm-up
    /// task. Absence means "not built yet" — queries fall back, never block.
    pub semantic_indexes: Arc<DashMap<CorpusId, Arc<SemanticIndex>>>,
    /// Per-corpus version history of the trie artifact, so the content a
    /// query actually reads is also the record of record for C3.5's
    /// doubly-linked supersession chain rather than a side effect of the L1/L2
    /// cache alone.
    pub trie_chains: Arc<DashMap<CorpusId, Arc<Mutex<ArtifactChain<Arc<TrieIndex>>>>>>,
    /// Per-corpus version history of the semantic artifact, populated
    /// alongside `semantic_indexes` by the warm-up task.
    pub semantic_chains: Arc<DashMap<CorpusId, Arc<Mutex<ArtifactChain<Arc<SemanticIndex>>>>>>,
    /// Per-corpus version history of the combined `SearchIndex` facade
    /// binding a corpus version to its current trie/semantic artifacts.
    pub search_index_chains: Arc<DashMap<CorpusId, Arc<Mutex<ArtifactChain<SearchIndex>>>>>,
    pub engine_status: Arc<RwLock<EngineStatus>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        corpus_store: Arc<CorpusStore>,
        cache: Arc<CacheManager>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            config,
            corpus_store,
            cache,
            embedder,
            semantic_indexes: Arc::new(DashMap::new()),
            trie_chains: Arc::new(DashMap::new()),
            semantic_chains: Arc::new(DashMap::new()),
            search_index_chains: Arc::new(DashMap::new()),
            engine_status: Arc::new(RwLock::new(EngineStatus::Uninitialized)),
            started_at: Instant::now(),
        }
    }

    pub async fn status(&self) -> EngineStatus {
        *self.engine_status.read().await
    }
}
