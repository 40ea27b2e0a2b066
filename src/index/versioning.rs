//! Artifact versioning (C3.5): a content-addressed, doubly-linked
//! supersession chain per resource, with deduplication on identical content.
//!
//! Grounded in the original implementation's provenance-chain tests
//! (`test_provenance_chains.py`): `is_latest`, `supersedes`, and
//! `superseded_by` form a chain navigable in both directions, with exactly
//! one `is_latest=true` record per `resource_id` at rest.

use crate::error::{CoreError, NotFoundError, Result};
use crate::hash::ContentHash;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One versioned artifact record. `T` is the artifact payload (a
/// `TrieIndex`, `SemanticIndex`, or `SearchIndex`).
#[derive(Debug, Clone)]
pub struct ArtifactRecord<T> {
    pub resource_id: String,
    pub data_hash: ContentHash,
    pub version: u64,
    pub supersedes: Option<ContentHash>,
    pub superseded_by: Option<ContentHash>,
    pub is_latest: bool,
    pub created_at: DateTime<Utc>,
    pub payload: T,
}

/// All versions ever published for one `resource_id`, keyed by content hash.
pub struct ArtifactChain<T> {
    resource_id: String,
    records: HashMap<ContentHash, ArtifactRecord<T>>,
    latest: Option<ContentHash>,
}

impl<T> ArtifactChain<T> {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            records: HashMap::new(),
            latest: None,
        }
    }

    /// Publish a new artifact version. If a record with the same
    /// `(resource_id, data_hash)` already exists, it is reused verbatim
    /// (deduplication) rather than re-inserted; no new version is created
    /// and the chain's `is_latest` pointer is left untouched unless the
    /// reused hash already *was* the latest.
    pub fn publish(&mut self, data_hash: ContentHash, payload: T) -> &ArtifactRecord<T> {
        if self.records.contains_key(&data_hash) {
            return self.records.get(&data_hash).expect("just checked");
        }

        let version = self.records.len() as u64 + 1;
        let supersedes = self.latest;

        if let Some(prev_hash) = self.latest {
            if let Some(prev) = self.records.get_mut(&prev_hash) {
                prev.superseded_by = Some(data_hash);
                prev.is_latest = false;
            }
        }

        let record = ArtifactRecord {
            resource_id: self.resource_id.clone(),
            data_hash,
            version,
            supersedes,
            superseded_by: None,
            is_latest: true,
            created_at: Utc::now(),
            payload,
        };
        self.records.insert(data_hash, record);
        self.latest = Some(data_hash);
        self.records.get(&data_hash).expect("just inserted")
    }

    pub fn latest(&self) -> Option<&ArtifactRecord<T>> {
        self.latest.and_then(|h| self.records.get(&h))
    }

    pub fn get(&self, data_hash: ContentHash) -> Result<&ArtifactRecord<T>> {
        self.records
            .get(&data_hash)
            .ok_or_else(|| CoreError::from(NotFoundError::Artifact(data_hash.to_string())))
    }

    /// Walk the chain from oldest to newest via `supersedes` links,
    /// starting from whichever record is currently `is_latest`.
    pub fn chain_newest_to_oldest(&self) -> Vec<&ArtifactRecord<T>> {
        let mut out = Vec::new();
        let mut cursor = self.latest;
        while let Some(hash) = cursor {
            let Some(record) = self.records.get(&hash) else {
                break;
            };
            out.push(record);
            cursor = record.supersedes;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
