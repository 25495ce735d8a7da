//! Parallel Search MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing the Parallel Search API as
//! a single `parallel_search` tool.

pub mod config;
pub mod error;
pub mod mcp;
pub mod parallel;

pub use config::Config;
pub use error::{ParallelMcpError, Result, SearchError};
