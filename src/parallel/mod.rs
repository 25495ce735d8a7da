//! Parallel Search API module
//!
//! Contains request validation, the API client, and response formatting.

pub mod client;
pub mod format;
pub mod request;
pub mod types;
