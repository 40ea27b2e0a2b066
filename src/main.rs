use floridify_search_core::api::{self, AppState, EngineStatus};
use floridify_search_core::cache::CacheManager;
use floridify_search_core::corpus::{CorpusStore, CorpusType, Language};
use floridify_search_core::index::semantic::SemanticIndex;
use floridify_search_core::index::versioning::ArtifactChain;
use floridify_search_core::index::{artifact_hash, Embedder, HashingEmbedder};
use floridify_search_core::{telemetry, AppConfig};
use std::sync::Arc;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() {
    telemetry::init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let corpus_store = Arc::new(CorpusStore::new());
    let cache = Arc::new(CacheManager::new(
        config.cache_dir.clone(),
        config.cache_capacities,
    ));
    let embedder: Arc<dyn floridify_search_core::index::Embedder> =
        Arc::new(HashingEmbedder::default());

    let state = Arc::new(AppState::new(config, corpus_store, cache, embedder));

    if state
        .corpus_store
        .create("default", Vec::new(), Language::Unknown, CorpusType::Custom)
        .await
        .is_err()
    {
        tracing::warn!("default corpus already present at start-up");
    }

    spawn_warmup(state.clone());

    let app = api::router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%bind_addr, error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!(%bind_addr, "listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}

/// Build every corpus's semantic index in the background. The health
/// endpoint reports `initializing` in the meantime and queries simply see
/// no semantic artifact yet (`semantic_pending: true`) rather than
/// blocking on this task.
fn spawn_warmup(state: Arc<AppState>) {
    tokio::spawn(async move {
        if !state.config.semantic_search_enabled {
            *state.engine_status.write().await = EngineStatus::Ready;
            return;
        }

        *state.engine_status.write().await = EngineStatus::Initializing;

        let ids: Vec<_> = {
            let store = &state.corpus_store;
            match store.get_by_name("default").await {
                Ok(corpus) => vec![corpus.corpus_id],
                Err(e) => {
                    tracing::error!(error = %e, "no default corpus to warm up");
                    *state.engine_status.write().await = EngineStatus::Error;
                    return;
                }
            }
        };

        for id in ids {
            let corpus = match state.corpus_store.get_by_id(id).await {
                Ok(corpus) => corpus,
                Err(e) => {
                    tracing::warn!(corpus_id = %id, error = %e, "corpus vanished before warm-up");
                    continue;
                }
            };
            let index = Arc::new(SemanticIndex::build(
                &corpus,
                state.embedder.as_ref(),
                false,
            ));
            state.semantic_indexes.insert(id, index.clone());

            let data_hash = artifact_hash(
                corpus.vocabulary_hash,
                "semantic",
                "v1",
                Some(state.embedder.model_id()),
            );
            let chain = state
                .semantic_chains
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(ArtifactChain::new(format!("semantic:{id}")))))
                .clone();
            chain.lock().await.publish(data_hash, index);
        }

        *state.engine_status.write().await = EngineStatus::Ready;
        tracing::info!("semantic warm-up complete");
    });
}
