//! MCP Tool definitions and handlers
//!
//! Defines the `parallel_search` tool and turns every outcome of a search,
//! including failures, into a text result.

use serde_json::{json, Value};

use crate::error::SearchError;
use crate::mcp::types::{CallToolResult, Tool};
use crate::parallel::client::ParallelClient;
use crate::parallel::format::format_response;
use crate::parallel::request::{
    parse_args, prepare_search, KeyFallbacks, MAX_CHARS_PER_RESULT, MAX_OBJECTIVE_CHARS,
    MAX_QUERY_CHARS, MAX_SEARCH_QUERIES, MIN_CHARS_PER_RESULT, MIN_RESULTS,
};

pub const PARALLEL_SEARCH: &str = "parallel_search";

const PARALLEL_SEARCH_DESCRIPTION: &str = "Search the web using Parallel Search API. Returns \
ranked, compressed excerpts optimized for LLMs. Ideal for agentic systems and LLM-based \
workflows that need web information.";

/// Per-call information supplied by the transport
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// `x-api-key` header of the HTTP request carrying the call
    pub api_key_header: Option<String>,
}

/// Tool handler
#[derive(Debug, Clone)]
pub struct ToolHandler {
    client: ParallelClient,

    /// Key captured from the environment at startup
    fallback_api_key: Option<String>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(client: ParallelClient, fallback_api_key: Option<String>) -> Self {
        Self {
            client,
            fallback_api_key,
        }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![Tool {
            name: PARALLEL_SEARCH.to_string(),
            description: Some(PARALLEL_SEARCH_DESCRIPTION.to_string()),
            input_schema: parallel_search_schema(),
        }]
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value, ctx: &CallContext) -> CallToolResult {
        match name {
            PARALLEL_SEARCH => self.handle_parallel_search(args, ctx).await,
            _ => CallToolResult::error(format!("Error: Unknown tool: {}", name)),
        }
    }

    // ==================== Tool Handlers ====================

    async fn handle_parallel_search(&self, args: Value, ctx: &CallContext) -> CallToolResult {
        match self.run_search(args, ctx).await {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                if e.is_validation() {
                    tracing::info!(error = %e, "Rejected search request");
                } else {
                    tracing::warn!(error = %e, "Search request failed");
                }
                CallToolResult::error(e.to_string())
            }
        }
    }

    async fn run_search(&self, args: Value, ctx: &CallContext) -> Result<String, SearchError> {
        let args = parse_args(args)?;
        let fallbacks = KeyFallbacks {
            header: ctx.api_key_header.as_deref(),
            environment: self.fallback_api_key.as_deref(),
        };
        let search = prepare_search(args, fallbacks)?;

        let response = self.client.search(&search).await?;
        Ok(format_response(&response))
    }
}

fn parallel_search_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "objective": {
                "type": "string",
                "maxLength": MAX_OBJECTIVE_CHARS,
                "description": "Natural-language description of what the web research goal is. \
                    Include any source or freshness guidance. At least one of objective or \
                    searchQueries is required. Max 5000 chars."
            },
            "searchQueries": {
                "type": "array",
                "items": {"type": "string", "maxLength": MAX_QUERY_CHARS},
                "maxItems": MAX_SEARCH_QUERIES,
                "description": "Optional search queries to guide the search. Maximum 5 queries, \
                    each max 200 characters. At least one of objective or searchQueries is required."
            },
            "processor": {
                "type": "string",
                "enum": ["base", "pro"],
                "default": "base",
                "description": "Processor to use: 'base' for fast, general queries; 'pro' for \
                    complex research requiring higher quality and freshness."
            },
            "maxResults": {
                "type": "integer",
                "minimum": MIN_RESULTS,
                "description": "Maximum number of search results to return."
            },
            "maxCharsPerResult": {
                "type": "integer",
                "minimum": MIN_CHARS_PER_RESULT,
                "maximum": MAX_CHARS_PER_RESULT,
                "description": "Maximum characters per search result excerpt. Minimum 100, maximum 30000."
            },
            "sourcePolicy": {
                "type": "object",
                "additionalProperties": true,
                "description": "Source policy to control retrieval sources. Can include \
                    include_domains, exclude_domains, or other policy options."
            },
            "apiKey": {
                "type": "string",
                "description": "Your Parallel API key. Get it from https://parallel.ai"
            }
        }
    })
}
