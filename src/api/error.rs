//! Maps `CoreError` onto HTTP status codes (§7): NotFound → 404,
//! Validation → 422, Conflict → 409, Transient → 503, Fatal → 500.
//!
//! `search()`'s trie lookup specifically degrades a `Transient` cache
//! failure into an uncached in-memory build instead of propagating it here
//! — a query always has a trie to run against. This mapping still applies
//! to everything else: corpus mutation, semantic lookups, and any other
//! path where a transient failure genuinely has nothing left to fall back
//! to.

use crate::error::CoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}
