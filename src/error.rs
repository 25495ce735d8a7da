//! Error types for the Parallel Search MCP Server
//!
//! `ParallelMcpError` covers process-level failures (configuration, I/O,
//! transport setup). `SearchError` covers a single tool invocation; its
//! `Display` output is the exact text handed back to the calling agent.

use thiserror::Error;

/// Main error type for the Parallel Search MCP Server
#[derive(Error, Debug)]
pub enum ParallelMcpError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidEnvVar { var: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Transport error: {message}")]
    TransportError { message: String },
}

/// Failure of a single `parallel_search` invocation.
///
/// None of these are fatal to the process; each one is rendered to text and
/// returned as the tool result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Error: At least one of 'objective' or 'search_queries' is required.")]
    MissingSearchInput,

    #[error(
        "Error: Parallel API key is required. Either pass it as 'api_key' parameter, \
         set PARALLEL_API_KEY environment variable, or configure it in your MCP client \
         headers as 'x-api-key'. Get your API key from https://parallel.ai"
    )]
    MissingApiKey,

    #[error("Error: Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Error: Request to Parallel Search API timed out")]
    Timeout,

    #[error("Error calling Parallel Search API: {message}")]
    Transport { message: String },

    #[error("Error: Parallel Search API returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

impl SearchError {
    /// Whether the failure was detected before any network call was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SearchError::MissingSearchInput
                | SearchError::MissingApiKey
                | SearchError::InvalidArguments { .. }
        )
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Transport {
                message: err.to_string(),
            }
        }
    }
}

/// Result type alias for Parallel Search MCP operations
pub type Result<T> = std::result::Result<T, ParallelMcpError>;
