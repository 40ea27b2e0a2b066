//! Explicit, typed configuration structs.
//!
//! The original system drove these from dynamic config objects; per the
//! redesign notes (SPEC_FULL.md §9) every option here is named and typed
//! instead, loaded from environment variables with `Default` fallbacks —
//! the same pattern the teacher uses for its `dirs`-based cache directory
//! resolution, just generalized to the rest of the process's knobs.

use std::path::PathBuf;

/// Top-level process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Root directory for the L2 disk cache.
    pub cache_dir: PathBuf,
    /// Whether to build the semantic (dense-vector) index at warm-up.
    pub semantic_search_enabled: bool,
    /// Per-namespace L1 (in-memory) cache capacities.
    pub cache_capacities: CacheCapacities,
    /// Default query parameters applied when a request omits them.
    pub default_query: QueryDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("floridify-search-core"),
            semantic_search_enabled: true,
            cache_capacities: CacheCapacities::default(),
            default_query: QueryDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Ok(dir) = std::env::var("CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }

        if let Ok(flag) = std::env::var("SEMANTIC_SEARCH_ENABLED") {
            config.semantic_search_enabled = parse_bool(&flag).unwrap_or(true);
        }

        config
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Per-namespace L1 cache capacities (entry counts, not bytes).
#[derive(Debug, Clone, Copy)]
pub struct CacheCapacities {
    pub search: usize,
    pub corpus: usize,
    pub trie: usize,
    pub semantic: usize,
    pub dictionary: usize,
    pub provider: usize,
    pub default: usize,
}

impl Default for CacheCapacities {
    fn default() -> Self {
        Self {
            search: 2048,
            corpus: 256,
            trie: 256,
            semantic: 64,
            dictionary: 4096,
            provider: 1024,
            default: 512,
        }
    }
}

/// Defaults applied to a `QueryParams` when the caller omits a field.
#[derive(Debug, Clone, Copy)]
pub struct QueryDefaults {
    pub max_results: u32,
    pub min_score: f32,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            max_results: 20,
            min_score: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn default_config_has_sane_bind_addr() {
        let config = AppConfig::default();
        check!(config.bind_addr == "0.0.0.0:8080");
        check!(config.semantic_search_enabled);
    }

    #[test]
    fn parse_bool_handles_common_spellings() {
        check!(parse_bool("true") == Some(true));
        check!(parse_bool("False") == Some(false));
        check!(parse_bool("yes") == Some(true));
        check!(parse_bool("nonsense") == None);
    }
}
