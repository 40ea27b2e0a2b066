//! Collaborator interfaces (§1): the core consumes dictionary providers and
//! an AI synthesizer only at these trait boundaries. Internals (scraping,
//! HTTP clients, prompting) are out of scope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    pub part_of_speech: String,
    pub text: String,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub word: String,
    pub source: String,
    pub definitions: Vec<Definition>,
}

/// Fetches definitions for one word at a time from some external source
/// (HTTP API, scraper). The core consumes only the vocabulary these
/// providers expose, never their fetch mechanics.
#[async_trait]
pub trait DictionaryProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, word: &str) -> crate::error::Result<ProviderEntry>;
}

/// Merges multiple providers' entries for one word into a single
/// synthesized definition set. Not part of the search core; consumes
/// provider data after it has been fetched.
#[async_trait]
pub trait DefinitionSynthesizer: Send + Sync {
    async fn synthesize(&self, entries: Vec<ProviderEntry>) -> crate::error::Result<ProviderEntry>;
}
