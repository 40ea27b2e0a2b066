//! Shared fixtures for the end-to-end HTTP tests: a full `AppState` wired
//! the same way `main.rs` wires it, minus the background warm-up task and
//! the bound listener. Each test gets its own in-memory store and a fresh
//! temp directory for the L2 disk cache.

use floridify_search_core::api::{self, AppState};
use floridify_search_core::cache::CacheManager;
use floridify_search_core::corpus::{CorpusStore, CorpusType, Language};
use floridify_search_core::index::HashingEmbedder;
use floridify_search_core::AppConfig;
use std::sync::Arc;
use tempfile::TempDir;

/// An isolated app instance plus the temp dir backing its disk cache, which
/// must stay alive for the duration of the test.
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    _cache_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let cache_dir = TempDir::new().expect("failed to create temp cache dir");

        let mut config = AppConfig::default();
        config.cache_dir = cache_dir.path().to_path_buf();
        config.semantic_search_enabled = false;

        let corpus_store = Arc::new(CorpusStore::new());
        let cache = Arc::new(CacheManager::new(
            config.cache_dir.clone(),
            config.cache_capacities,
        ));
        let embedder: Arc<dyn floridify_search_core::index::Embedder> =
            Arc::new(HashingEmbedder::default());

        let state = Arc::new(AppState::new(config, corpus_store, cache, embedder));
        let router = api::router(state.clone());

        Self {
            router,
            state,
            _cache_dir: cache_dir,
        }
    }

    /// Creates a corpus directly through the store, bypassing the HTTP
    /// surface, so search tests can set up fixtures without round-tripping
    /// JSON for every word list.
    pub async fn seed_corpus(&self, name: &str, words: &[&str]) -> floridify_search_core::corpus::CorpusId {
        let corpus = self
            .state
            .corpus_store
            .create(
                name,
                words.iter().map(|w| w.to_string()),
                Language::English,
                CorpusType::Custom,
            )
            .await
            .expect("seed corpus creation should succeed");
        corpus.corpus_id
    }
}
