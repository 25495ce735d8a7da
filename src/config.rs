//! Configuration management for the Parallel Search MCP Server
//!
//! Configuration is read once at startup and never mutated afterwards. The
//! fallback API key captured here is handed to the tool handler explicitly.

use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Configuration for the Parallel Search MCP Server
#[derive(Clone)]
pub struct Config {
    /// Fallback API key from `PARALLEL_API_KEY`
    pub api_key: Option<String>,

    /// Search endpoint
    pub api_url: String,

    /// Budget for a single outbound search request
    pub request_timeout: Duration,

    /// HTTP transport bind address
    pub host: String,

    /// HTTP transport port
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("request_timeout", &self.request_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Create a configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(env::API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let api_url = lookup(env::API_URL)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| parallel::SEARCH_URL.to_string());

        let timeout_secs = match lookup(env::TIMEOUT_SECS) {
            Some(raw) => parse_var::<u64>(env::TIMEOUT_SECS, &raw)?,
            None => defaults::TIMEOUT_SECS,
        };

        let host = lookup(env::HOST)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| defaults::HOST.to_string());

        let port = match lookup(env::PORT) {
            Some(raw) => parse_var::<u16>(env::PORT, &raw)?,
            None => defaults::PORT,
        };

        let config = Self {
            api_key,
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            host,
            port,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check invariants that the lookup alone cannot guarantee
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig {
                message: "request timeout must be greater than zero".to_string(),
            }
            .into());
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::InvalidConfig {
                message: format!("search endpoint must be an http(s) URL: {}", self.api_url),
            }
            .into());
        }

        Ok(())
    }

    /// Socket address string for the HTTP transport
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: parallel::SEARCH_URL.to_string(),
            request_timeout: Duration::from_secs(defaults::TIMEOUT_SECS),
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
        }
    }
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        ConfigError::InvalidEnvVar {
            var: var.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Environment variable names
pub mod env {
    pub const API_KEY: &str = "PARALLEL_API_KEY";
    pub const API_URL: &str = "PARALLEL_API_URL";
    pub const TIMEOUT_SECS: &str = "PARALLEL_TIMEOUT_SECS";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
}

mod defaults {
    pub const TIMEOUT_SECS: u64 = 60;
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8000;
}

/// Parallel API constants
pub mod parallel {
    /// Search endpoint
    pub const SEARCH_URL: &str = "https://api.parallel.ai/v1beta/search";

    /// Header carrying the API key, both upstream and on the HTTP transport
    pub const API_KEY_HEADER: &str = "x-api-key";
}
