//! Centralized error handling with typed error enums.
//!
//! Mirrors the five error kinds the search core distinguishes (§7): NotFound,
//! Validation, Conflict, Transient, and Fatal. Each maps onto an HTTP status
//! in the API layer (see `api::error`), the way a `ToolError` maps onto a
//! client-facing message elsewhere in this codebase's lineage.

use thiserror::Error;

/// A specialized Result type for search-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Top-level error type for all core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A named resource (corpus, word, artifact) does not exist.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// The request failed input validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The request conflicts with existing state.
    #[error("{0}")]
    Conflict(#[from] ConflictError),

    /// A dependency is temporarily unavailable; the caller should degrade
    /// gracefully rather than fail outright.
    #[error("{0}")]
    Transient(#[from] TransientError),

    /// An artifact or index is corrupted beyond local recovery.
    #[error("{0}")]
    Fatal(#[from] FatalError),
}

impl CoreError {
    /// Short machine-readable kind, used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Transient(_) => "transient",
            Self::Fatal(_) => "fatal",
        }
    }
}

#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("corpus '{0}' not found")]
    Corpus(String),

    #[error("word '{0}' not found in corpus '{1}'")]
    Word(String, String),

    #[error("index artifact '{0}' not found")]
    Artifact(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("max_results must be between 1 and 100, got {0}")]
    MaxResultsOutOfRange(u32),

    #[error("min_score must be between 0.0 and 1.0, got {0}")]
    MinScoreOutOfRange(f32),

    #[error("unknown search mode '{0}'")]
    UnknownMode(String),

    #[error("unknown corpus type '{0}'")]
    UnknownCorpusType(String),

    #[error("unknown language tag '{0}'")]
    UnknownLanguage(String),

    #[error("corpus name '{0}' must be 1-64 characters of letters, digits, underscore, or hyphen")]
    InvalidCorpusName(String),
}

#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("corpus named '{0}' already exists")]
    DuplicateCorpus(String),

    #[error("attaching '{child}' to '{parent}' would create a cycle")]
    Cycle { parent: String, child: String },

    #[error("corpus '{0}' has children and cannot be deleted without cascade=true")]
    HasChildren(String),

    #[error("version chain for resource '{0}' is inconsistent: {1}")]
    VersionChainViolation(String, String),

    #[error("corpus '{0}' already has a parent")]
    AlreadyHasParent(String),
}

#[derive(Debug, Error)]
pub enum TransientError {
    #[error("cache backend unavailable: {0}")]
    CacheUnavailable(String),

    #[error("embedding model still loading")]
    EmbeddingModelLoading,
}

#[derive(Debug, Error)]
pub enum FatalError {
    #[error("artifact '{0}' is corrupted: {1}")]
    CorruptedArtifact(String, String),

    #[error("hash mismatch loading '{0}': expected {1}, got {2}")]
    HashMismatch(String, String, String),
}
