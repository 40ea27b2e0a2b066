//! Shared search types: results, matcher identity, and query parameters.

use crate::corpus::Language;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    Exact,
    Prefix,
    Fuzzy,
    Semantic,
}

impl SearchMethod {
    /// Lower is higher priority; used to order cascade results and to break
    /// ties on dedup.
    pub fn priority(self) -> u8 {
        match self {
            Self::Exact => 0,
            Self::Prefix => 1,
            Self::Fuzzy => 2,
            Self::Semantic => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub word: String,
    pub normalized: String,
    pub score: f32,
    pub method: SearchMethod,
    pub language: Language,
    pub distance: u32,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Exact,
    Prefix,
    Fuzzy,
    Semantic,
    Smart,
}

impl std::str::FromStr for SearchMode {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "prefix" => Ok(Self::Prefix),
            "fuzzy" => Ok(Self::Fuzzy),
            "semantic" => Ok(Self::Semantic),
            "smart" => Ok(Self::Smart),
            other => Err(crate::error::ValidationError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryParams {
    pub q: String,
    pub mode: SearchMode,
    pub max_results: u32,
    pub min_score: f32,
    pub corpus_name: Option<String>,
    pub languages: Vec<Language>,
}

impl QueryParams {
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::{CoreError, ValidationError};

        if self.q.trim().is_empty() {
            return Err(CoreError::from(ValidationError::EmptyQuery));
        }
        if !(1..=100).contains(&self.max_results) {
            return Err(CoreError::from(ValidationError::MaxResultsOutOfRange(
                self.max_results,
            )));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(CoreError::from(ValidationError::MinScoreOutOfRange(
                self.min_score,
            )));
        }
        Ok(())
    }
}
