//! Rendering of search responses as LLM-readable text

use crate::parallel::types::{SearchResponse, SearchResultEntry};

const UNKNOWN_ID: &str = "unknown";
const NO_TITLE: &str = "No title";
const NO_URL: &str = "No URL";
const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

/// Render a parsed response
///
/// A response without results yields a short "no results" notice that still
/// carries the search ID.
pub fn format_response(response: &SearchResponse) -> String {
    let search_id = response.search_id.as_deref().unwrap_or(UNKNOWN_ID);
    let entries = response.entries();

    if entries.is_empty() {
        return format!("Search completed (ID: {}) but no results found.", search_id);
    }

    let body = entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR);

    format!("Search ID: {}\n\n{}", search_id, body)
}

fn format_entry(entry: &SearchResultEntry) -> String {
    format!(
        "**{}**\nURL: {}\n{}",
        entry.title.as_deref().unwrap_or(NO_TITLE),
        entry.url.as_deref().unwrap_or(NO_URL),
        entry.excerpts.join(" ")
    )
}
