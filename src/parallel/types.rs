//! Parallel Search API type definitions
//!
//! These types mirror the Parallel Search API request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Search quality tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    /// Fast, general queries
    #[default]
    Base,

    /// Complex research requiring higher quality and freshness
    Pro,
}

impl Processor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Processor::Base => "base",
            Processor::Pro => "pro",
        }
    }
}

/// Body of a search request
///
/// Unset fields are omitted from the JSON body; the API reads a missing
/// field differently from an explicit `null`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SearchRequest {
    /// Processor tier (always sent)
    pub processor: Processor,

    /// Natural-language research goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,

    /// Keyword queries guiding the search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_queries: Option<Vec<String>>,

    /// Upper bound on returned results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    /// Upper bound on excerpt characters per result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars_per_result: Option<u32>,

    /// Domain include/exclude directives, forwarded as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_policy: Option<Map<String, Value>>,
}

/// Body of a successful search response
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SearchResponse {
    /// Upstream-assigned search identifier
    #[serde(default)]
    pub search_id: Option<String>,

    /// Ranked results
    #[serde(default)]
    pub results: Option<Vec<SearchResultEntry>>,
}

impl SearchResponse {
    /// Results, treating an absent list as empty
    pub fn entries(&self) -> &[SearchResultEntry] {
        self.results.as_deref().unwrap_or_default()
    }
}

/// A single search result
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SearchResultEntry {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Text fragments extracted from the page
    #[serde(default, deserialize_with = "null_as_empty")]
    pub excerpts: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
