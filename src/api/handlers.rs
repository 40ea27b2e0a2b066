//! Route handlers (§6).

use super::dto::{
    CorpusDescriptor, CreateCorpusRequest, DeleteCorpusQuery, HealthResponse,
    SearchQuery, SearchResponse, SearchResultDto, SemanticStatusResponse,
};
use super::error::ApiError;
use super::state::{AppState, EngineStatus};
use crate::corpus::{Corpus, CorpusId};
use crate::error::{CoreError, NotFoundError};
use crate::hash::ContentHash;
use crate::index::versioning::ArtifactChain;
use crate::index::{artifact_hash, trie::TrieIndex, Embedder, MatcherConfig, SearchIndex};
use crate::search::{QueryParams, SearchArtifacts, SearchMode};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

async fn resolve_corpus(state: &AppState, name_or_id: Option<&str>) -> Result<Arc<Corpus>, ApiError> {
    match name_or_id {
        Some(identifier) => {
            if let Ok(id) = CorpusId::parse_str(identifier) {
                if let Ok(corpus) = state.corpus_store.get_by_id(id).await {
                    return Ok(corpus);
                }
            }
            state
                .corpus_store
                .get_by_name(identifier)
                .await
                .map_err(ApiError::from)
        }
        None => state
            .corpus_store
            .get_by_name("default")
            .await
            .map_err(ApiError::from),
    }
}

/// Build or fetch the trie for `corpus`, keyed purely by `vocabulary_hash`
/// so corpora sharing a vocabulary share one cached artifact. A cache
/// backend failure degrades to an uncached, in-memory build rather than
/// failing the request — the trie is cheap to rebuild and the query must
/// still complete (§7: transient failures never reach the caller as 5xx).
async fn trie_for(state: &AppState, corpus: &Corpus) -> Result<Arc<TrieIndex>, ApiError> {
    let key = corpus.vocabulary_hash.to_string();
    let corpus_owned = corpus.clone();
    let trie = match state
        .cache
        .get_or_load(crate::cache::Namespace::Trie, &key, move || async move {
            Ok::<TrieIndex, CoreError>(TrieIndex::build(&corpus_owned))
        })
        .await
    {
        Ok(trie) => trie,
        Err(CoreError::Transient(_)) => {
            tracing::warn!(
                corpus_id = %corpus.corpus_id,
                "trie cache unavailable, building in-memory without caching"
            );
            TrieIndex::build(corpus)
        }
        Err(err) => return Err(ApiError::from(err)),
    };

    Ok(publish_trie(state, corpus, trie).await)
}

/// Record the built trie in its corpus's version chain (C3.5), reusing the
/// chain's own copy when the content hash is unchanged rather than the one
/// just built.
async fn publish_trie(state: &AppState, corpus: &Corpus, trie: TrieIndex) -> Arc<TrieIndex> {
    let data_hash = artifact_hash(corpus.vocabulary_hash, "trie", "v1", None);
    let chain = state
        .trie_chains
        .entry(corpus.corpus_id)
        .or_insert_with(|| Arc::new(Mutex::new(ArtifactChain::new(format!("trie:{}", corpus.corpus_id)))))
        .clone();
    let mut chain = chain.lock().await;
    chain.publish(data_hash, Arc::new(trie)).payload.clone()
}

/// Record the current (trie, semantic) artifact pair as a `SearchIndex`
/// facade version for this corpus, so the version chain reflects the whole
/// matcher surface a query actually used, not just its trie.
async fn record_search_index(
    state: &AppState,
    corpus: &Corpus,
    trie_hash: ContentHash,
    semantic_hash: Option<ContentHash>,
) {
    let search_index = SearchIndex {
        corpus_vocabulary_hash: corpus.vocabulary_hash,
        trie_hash,
        semantic_hash,
        matchers: MatcherConfig::default(),
    };
    let data_hash = ContentHash::of_parts([
        corpus.vocabulary_hash.as_hex().as_str(),
        trie_hash.as_hex().as_str(),
        semantic_hash.map(|h| h.as_hex()).unwrap_or_default().as_str(),
    ]);
    let chain = state
        .search_index_chains
        .entry(corpus.corpus_id)
        .or_insert_with(|| {
            Arc::new(Mutex::new(ArtifactChain::new(format!(
                "search_index:{}",
                corpus.corpus_id
            ))))
        })
        .clone();
    chain.lock().await.publish(data_hash, search_index);
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let mode = params
        .mode
        .as_deref()
        .map(SearchMode::from_str)
        .transpose()
        .map_err(CoreError::from)?
        .unwrap_or(SearchMode::Smart);

    let query = QueryParams {
        q: params.q.clone(),
        mode,
        max_results: params
            .max_results
            .unwrap_or(state.config.default_query.max_results),
        min_score: params
            .min_score
            .unwrap_or(state.config.default_query.min_score),
        corpus_name: params.corpus_name.clone(),
        languages: super::dto::parse_language_list(params.languages.as_deref()),
    };
    query.validate().map_err(ApiError::from)?;

    let corpus = resolve_corpus(&state, query.corpus_name.as_deref()).await?;
    let trie = trie_for(&state, &corpus).await?;
    let semantic = state.semantic_indexes.get(&corpus.corpus_id).map(|e| e.clone());

    let trie_hash = artifact_hash(corpus.vocabulary_hash, "trie", "v1", None);
    let semantic_hash = semantic
        .is_some()
        .then(|| artifact_hash(corpus.vocabulary_hash, "semantic", "v1", Some(state.embedder.model_id())));
    record_search_index(&state, &corpus, trie_hash, semantic_hash).await;

    let etag = ContentHash::of_parts([
        corpus.vocabulary_hash.as_hex().as_str(),
        query.q.as_str(),
        &format!("{:?}", query.mode),
        &query.max_results.to_string(),
        &query.min_score.to_string(),
    ])
    .to_string();

    if let Some(if_none_match) = headers.get(axum::http::header::IF_NONE_MATCH) {
        if if_none_match.to_str().ok() == Some(etag.as_str()) {
            return Ok(StatusCode::NOT_MODIFIED.into_response());
        }
    }

    let artifacts = SearchArtifacts {
        trie: &trie,
        semantic: semantic.as_deref(),
        embedder: state.embedder.as_ref(),
    };
    let outcome = crate::search::search(&corpus, &artifacts, &query);

    let languages: Vec<String> = outcome
        .results
        .iter()
        .map(|r| r.language.as_str().to_string())
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .collect();

    let body = SearchResponse {
        query: query.q.clone(),
        total_found: outcome.results.len(),
        results: outcome
            .results
            .iter()
            .map(|r| SearchResultDto {
                word: r.word.clone(),
                normalized: r.normalized.clone(),
                score: r.score,
                method: r.method,
                language: r.language.as_str().to_string(),
                distance: r.distance,
                metadata: r.metadata.clone(),
            })
            .collect(),
        languages,
        mode: format!("{:?}", query.mode).to_lowercase(),
        metadata: json!({ "semantic_pending": outcome.semantic_pending }),
    };

    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(axum::http::header::ETAG, etag.parse().expect("hex etag is valid header value"));
    Ok(response)
}

pub async fn create_corpus(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCorpusRequest>,
) -> Result<Json<CorpusDescriptor>, ApiError> {
    let language = request
        .language
        .parse()
        .map_err(CoreError::from)
        .map_err(ApiError::from)?;
    let corpus_type = super::dto::parse_corpus_type(&request.source_type).map_err(ApiError::from)?;

    let mut corpus = state
        .corpus_store
        .create(request.name, request.vocabulary, language, corpus_type)
        .await
        .map_err(ApiError::from)?;

    if request.is_master {
        corpus = state
            .corpus_store
            .set_master(corpus.corpus_id, true)
            .await
            .map_err(ApiError::from)?;
    }

    if let Some(hours) = request.ttl_hours {
        let store = state.corpus_store.clone();
        let id = corpus.corpus_id;
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(hours * 3600)).await;
            if let Err(err) = store.delete(id, false).await {
                tracing::warn!(corpus_id = %id, %err, "scheduled TTL deletion failed");
            }
        });
    }

    Ok(Json(CorpusDescriptor::from_corpus(&corpus)))
}

pub async fn get_corpus(
    State(state): State<Arc<AppState>>,
    Path(name_or_id): Path<String>,
) -> Result<Json<CorpusDescriptor>, ApiError> {
    let corpus = resolve_corpus(&state, Some(&name_or_id)).await?;
    Ok(Json(CorpusDescriptor::from_corpus(&corpus)))
}

pub async fn delete_corpus(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteCorpusQuery>,
) -> Result<StatusCode, ApiError> {
    let id = CorpusId::parse_str(&id)
        .map_err(|_| CoreError::from(NotFoundError::Corpus(id.clone())))?;
    state
        .corpus_store
        .delete(id, params.cascade)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.status().await;
    let stats = state.cache.get_stats().await;
    let (hits, misses) = stats
        .values()
        .fold((0u64, 0u64), |(h, m), s| (h + s.hits, m + s.misses));
    let hit_rate = if hits + misses == 0 {
        0.0
    } else {
        hits as f64 / (hits + misses) as f64
    };

    Json(HealthResponse {
        status: if status == EngineStatus::Error {
            "degraded".to_string()
        } else {
            "healthy".to_string()
        },
        search_engine: status.as_str().to_string(),
        database: "in-memory".to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cache_hit_rate: hit_rate,
        connection_pool: json!({ "active": 0, "idle": 0 }),
    })
}

pub async fn semantic_status(State(state): State<Arc<AppState>>) -> Json<SemanticStatusResponse> {
    let status = state.status().await;
    let enabled = state.config.semantic_search_enabled;
    let building = enabled && status == EngineStatus::Initializing;
    let ready = enabled && status == EngineStatus::Ready;

    let message = if !enabled {
        "semantic search disabled by configuration".to_string()
    } else if ready {
        "semantic index ready".to_string()
    } else if building {
        "semantic index building".to_string()
    } else {
        "semantic index not yet started".to_string()
    };

    Json(SemanticStatusResponse {
        enabled,
        ready,
        building,
        message,
    })
}
