//! Argument validation and request building for `parallel_search`
//!
//! Turns raw tool arguments into a [`PreparedSearch`] or a terminal
//! [`SearchError`]. Nothing here touches the network or the process
//! environment; fallback credentials are passed in by the caller.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::SearchError;
use crate::parallel::types::{Processor, SearchRequest};

pub const MAX_OBJECTIVE_CHARS: u64 = 5000;
pub const MAX_SEARCH_QUERIES: u64 = 5;
pub const MAX_QUERY_CHARS: u64 = 200;
pub const MIN_RESULTS: u64 = 1;
pub const MIN_CHARS_PER_RESULT: u64 = 100;
pub const MAX_CHARS_PER_RESULT: u64 = 30000;

/// Arguments accepted by the `parallel_search` tool
///
/// Field names are camelCase, with snake_case aliases.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs {
    #[validate(length(max = "MAX_OBJECTIVE_CHARS"))]
    pub objective: Option<String>,

    #[serde(alias = "search_queries")]
    #[validate(length(max = "MAX_SEARCH_QUERIES"))]
    #[validate(custom = "validate_query_lengths")]
    pub search_queries: Option<Vec<String>>,

    pub processor: Option<Processor>,

    #[serde(alias = "max_results")]
    #[validate(range(min = "MIN_RESULTS"))]
    pub max_results: Option<u32>,

    #[serde(alias = "max_chars_per_result")]
    #[validate(range(min = "MIN_CHARS_PER_RESULT", max = "MAX_CHARS_PER_RESULT"))]
    pub max_chars_per_result: Option<u32>,

    #[serde(alias = "source_policy")]
    pub source_policy: Option<Map<String, Value>>,

    #[serde(alias = "api_key")]
    pub api_key: Option<String>,
}

#[allow(clippy::ptr_arg)]
fn validate_query_lengths(queries: &Vec<String>) -> Result<(), ValidationError> {
    match queries
        .iter()
        .position(|q| q.chars().count() as u64 > MAX_QUERY_CHARS)
    {
        Some(index) => {
            let mut err = ValidationError::new("query_length");
            err.message = Some(Cow::from(format!(
                "query {} exceeds {} characters",
                index + 1,
                MAX_QUERY_CHARS
            )));
            Err(err)
        }
        None => Ok(()),
    }
}

/// Where the credential for a call came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// `apiKey` tool argument
    Argument,
    /// `x-api-key` header on the HTTP transport
    Header,
    /// `PARALLEL_API_KEY` captured at startup
    Environment,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KeySource::Argument => "argument",
            KeySource::Header => "header",
            KeySource::Environment => "environment",
        })
    }
}

/// Credentials to fall back on when the call carries no `apiKey`
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyFallbacks<'a> {
    pub header: Option<&'a str>,
    pub environment: Option<&'a str>,
}

/// A validated search ready to send upstream
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSearch {
    pub request: SearchRequest,
    pub api_key: String,
    pub key_source: KeySource,
}

/// Deserialize raw tool arguments
///
/// A missing argument object is treated as empty so that the caller gets
/// the missing-input message rather than a type error.
pub fn parse_args(args: Value) -> Result<SearchArgs, SearchError> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    serde_json::from_value(args).map_err(|e| SearchError::InvalidArguments {
        message: e.to_string(),
    })
}

/// Validate arguments, resolve the credential and build the request body
pub fn prepare_search(
    args: SearchArgs,
    fallbacks: KeyFallbacks<'_>,
) -> Result<PreparedSearch, SearchError> {
    let objective = args.objective.clone().filter(|o| !o.is_empty());
    let search_queries = args.search_queries.clone().filter(|q| !q.is_empty());

    if objective.is_none() && search_queries.is_none() {
        return Err(SearchError::MissingSearchInput);
    }

    args.validate().map_err(|errors| SearchError::InvalidArguments {
        message: describe_validation_errors(&errors),
    })?;

    let (api_key, key_source) = resolve_api_key(args.api_key.as_deref(), fallbacks)
        .ok_or(SearchError::MissingApiKey)?;

    let request = SearchRequest {
        processor: args.processor.unwrap_or_default(),
        objective,
        search_queries,
        max_results: args.max_results,
        max_chars_per_result: args.max_chars_per_result,
        source_policy: args.source_policy.filter(|p| !p.is_empty()),
    };

    Ok(PreparedSearch {
        request,
        api_key: api_key.to_string(),
        key_source,
    })
}

/// Pick the first non-empty key: argument, then header, then environment
pub fn resolve_api_key<'a>(
    explicit: Option<&'a str>,
    fallbacks: KeyFallbacks<'a>,
) -> Option<(&'a str, KeySource)> {
    let non_empty = |k: Option<&'a str>| k.map(str::trim).filter(|k| !k.is_empty());

    non_empty(explicit)
        .map(|k| (k, KeySource::Argument))
        .or_else(|| non_empty(fallbacks.header).map(|k| (k, KeySource::Header)))
        .or_else(|| non_empty(fallbacks.environment).map(|k| (k, KeySource::Environment)))
}

fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |e| format!("'{}' {}", argument_name(field), describe_error(field, e)))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render a single failure from its bound params
fn describe_error(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let bound = |name: &str| error.params.get(name).and_then(Value::as_f64).map(|v| v as u64);

    match (error.code.as_ref(), bound("min"), bound("max")) {
        ("length", _, Some(max)) if field == "search_queries" => {
            format!("must contain at most {} queries", max)
        }
        ("length", _, Some(max)) => format!("must be at most {} characters", max),
        ("range", Some(min), Some(max)) => format!("must be between {} and {}", min, max),
        ("range", Some(min), None) => format!("must be at least {}", min),
        (code, ..) => code.to_string(),
    }
}

/// Schema name of a `SearchArgs` field
fn argument_name(field: &str) -> &str {
    match field {
        "search_queries" => "searchQueries",
        "max_results" => "maxResults",
        "max_chars_per_result" => "maxCharsPerResult",
        "source_policy" => "sourcePolicy",
        "api_key" => "apiKey",
        other => other,
    }
}
