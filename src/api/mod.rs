//! REST surface (§6): axum router, request/response DTOs, and the
//! `CoreError` → HTTP status mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

pub use state::{AppState, EngineStatus};

use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(),
    components(schemas(
        dto::SearchResultDto,
        dto::SearchResponse,
        dto::CreateCorpusRequest,
        dto::CorpusDescriptor,
        dto::HealthResponse,
        dto::SemanticStatusResponse,
    )),
    tags((name = "search", description = "Multilingual vocabulary search"))
)]
pub struct ApiDoc;

/// Build the full router, wired with the shared state and the trace/CORS
/// layers the teacher's own stdio transport doesn't need but a process
/// exposing a network surface does.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(handlers::search))
        .route("/corpus", post(handlers::create_corpus))
        .route("/corpus/:id", get(handlers::get_corpus))
        .route("/corpus/:id", delete(handlers::delete_corpus))
        .route("/health", get(handlers::health))
        .route("/search/semantic/status", get(handlers::semantic_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
