//! Integration tests for Parallel Search MCP Server
//!
//! These tests drive the MCP dispatcher and HTTP router end to end against a
//! mock Parallel Search API; they don't make real API calls.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parallel_search_mcp::mcp::server::McpServer;
use parallel_search_mcp::mcp::tools::{CallContext, ToolHandler};
use parallel_search_mcp::parallel::client::ParallelClient;

const SEARCH_PATH: &str = "/v1beta/search";

/// Helper to create a JSON-RPC request
fn make_request(id: i64, method: &str, params: Option<Value>) -> Value {
    let mut request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        request["params"] = p;
    }
    request
}

/// Helper to build a `tools/call` for `parallel_search`
fn search_call(arguments: Value) -> Value {
    make_request(
        1,
        "tools/call",
        Some(json!({"name": "parallel_search", "arguments": arguments})),
    )
}

fn server_for(upstream: &MockServer, fallback_key: Option<&str>, timeout: Duration) -> McpServer {
    let client = ParallelClient::new(format!("{}{}", upstream.uri(), SEARCH_PATH), timeout).unwrap();
    McpServer::new(ToolHandler::new(client, fallback_key.map(str::to_string)))
}

/// Send a request and return (text, isError) of the tool result
async fn call(server: &McpServer, request: Value, ctx: &CallContext) -> (String, bool) {
    let response = server
        .handle_message(&request.to_string(), ctx)
        .await
        .expect("tools/call always answers");
    let response = serde_json::to_value(response).unwrap();

    assert!(response["error"].is_null(), "tool failures must not be JSON-RPC errors");
    let result = &response["result"];
    assert_eq!(result["content"].as_array().unwrap().len(), 1);
    assert_eq!(result["content"][0]["type"], "text");

    (
        result["content"][0]["text"].as_str().unwrap().to_string(),
        result["isError"].as_bool().unwrap_or(false),
    )
}

mod validation_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_inputs_make_no_network_call() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("env-key"), Duration::from_secs(5));
        for arguments in [
            json!({}),
            json!({"processor": "pro", "maxResults": 5}),
            json!({"objective": "", "searchQueries": []}),
            json!({"apiKey": "explicit"}),
        ] {
            let (text, is_error) = call(&server, search_call(arguments), &CallContext::default()).await;
            assert!(is_error);
            assert_eq!(
                text,
                "Error: At least one of 'objective' or 'search_queries' is required."
            );
        }
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_network_call() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, None, Duration::from_secs(5));
        let (text, is_error) =
            call(&server, search_call(json!({"objective": "rust"})), &CallContext::default()).await;

        assert!(is_error);
        assert!(text.contains("PARALLEL_API_KEY"));
        assert!(text.contains("x-api-key"));
        assert!(text.contains("https://parallel.ai"));
    }

    #[tokio::test]
    async fn test_out_of_bounds_arguments_make_no_network_call() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("k"), Duration::from_secs(5));
        let (text, is_error) = call(
            &server,
            search_call(json!({"objective": "x", "maxCharsPerResult": 50})),
            &CallContext::default(),
        )
        .await;

        assert!(is_error);
        assert!(text.starts_with("Error: Invalid arguments:"));
    }
}

mod upstream_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_call_with_default_processor() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .and(header("x-api-key", "env-key"))
            .and(body_json(json!({"processor": "base", "search_queries": ["rust mcp"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_id": "s1",
                "results": []
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("env-key"), Duration::from_secs(5));
        let (text, is_error) = call(
            &server,
            search_call(json!({"searchQueries": ["rust mcp"]})),
            &CallContext::default(),
        )
        .await;

        assert!(!is_error);
        assert!(text.contains("s1"));
        assert!(text.contains("no results found"));
    }

    #[tokio::test]
    async fn test_objective_and_queries_forwarded_together() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .and(body_json(json!({
                "processor": "pro",
                "objective": "find the axum changelog",
                "search_queries": ["axum 0.7 release", "axum changelog"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_id": "both",
                "results": [{"title": "axum", "url": "https://docs.rs/axum", "excerpts": ["0.7"]}]
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("k"), Duration::from_secs(5));
        let (text, is_error) = call(
            &server,
            search_call(json!({
                "objective": "find the axum changelog",
                "searchQueries": ["axum 0.7 release", "axum changelog"],
                "processor": "pro"
            })),
            &CallContext::default(),
        )
        .await;

        assert!(!is_error, "got: {}", text);
        assert!(text.starts_with("Search ID: both"));
        assert!(text.contains("URL: https://docs.rs/axum"));
    }

    #[tokio::test]
    async fn test_results_rendered_in_order() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_id": "s2",
                "results": [{"title": "T", "url": "U", "excerpts": ["a", "b"]}]
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("k"), Duration::from_secs(5));
        let (text, is_error) =
            call(&server, search_call(json!({"objective": "o"})), &CallContext::default()).await;

        assert!(!is_error);
        let positions: Vec<usize> = ["s2", "**T**", "U", "a b"]
            .iter()
            .map(|needle| text.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "got: {}", text);
    }

    #[tokio::test]
    async fn test_placeholders_for_missing_title_and_url() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_id": "s3",
                "results": [{"excerpts": ["only text"]}]
            })))
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("k"), Duration::from_secs(5));
        let (text, _) =
            call(&server, search_call(json!({"objective": "o"})), &CallContext::default()).await;

        assert!(text.contains("**No title**"));
        assert!(text.contains("URL: No URL"));
        assert!(text.contains("only text"));
    }

    #[tokio::test]
    async fn test_server_error_embeds_status_and_body() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("k"), Duration::from_secs(5));
        let (text, is_error) =
            call(&server, search_call(json!({"objective": "o"})), &CallContext::default()).await;

        assert!(is_error);
        assert!(text.contains("500"));
        assert!(text.contains("server error"));
    }

    #[tokio::test]
    async fn test_timeout_has_fixed_text() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"search_id": "slow"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("k"), Duration::from_millis(50));
        let (text, is_error) =
            call(&server, search_call(json!({"objective": "o"})), &CallContext::default()).await;

        assert!(is_error);
        assert_eq!(text, "Error: Request to Parallel Search API timed out");
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_next_call() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .up_to_n_times(1)
            .mount(&upstream)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_id": "ok",
                "results": [{"title": "Back", "url": "https://up.example", "excerpts": []}]
            })))
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("k"), Duration::from_secs(5));
        let (first, first_error) =
            call(&server, search_call(json!({"objective": "o"})), &CallContext::default()).await;
        let (second, second_error) =
            call(&server, search_call(json!({"objective": "o"})), &CallContext::default()).await;

        assert!(first_error);
        assert!(first.contains("503"));
        assert!(!second_error);
        assert!(second.starts_with("Search ID: ok"));
    }

    #[tokio::test]
    async fn test_same_response_formats_identically() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_id": "s4",
                "results": [
                    {"title": "A", "url": "https://a.example", "excerpts": ["one", "two"]},
                    {"title": "B", "url": "https://b.example", "excerpts": ["three"]}
                ]
            })))
            .expect(2)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("k"), Duration::from_secs(5));
        let (first, _) =
            call(&server, search_call(json!({"objective": "o"})), &CallContext::default()).await;
        let (second, _) =
            call(&server, search_call(json!({"objective": "o"})), &CallContext::default()).await;

        assert_eq!(first, second);
        assert!(first.contains("\n\n---\n\n"));
    }
}

mod credential_tests {
    use super::*;

    #[tokio::test]
    async fn test_explicit_key_sent_over_environment() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "explicit-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search_id": "s"})))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("env-key"), Duration::from_secs(5));
        let (text, is_error) = call(
            &server,
            search_call(json!({"objective": "o", "apiKey": "explicit-key"})),
            &CallContext::default(),
        )
        .await;

        assert!(!is_error, "unexpected error: {}", text);
    }

    #[tokio::test]
    async fn test_header_key_used_when_no_argument() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "header-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search_id": "s"})))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = server_for(&upstream, Some("env-key"), Duration::from_secs(5));
        let ctx = CallContext {
            api_key_header: Some("header-key".to_string()),
        };
        let (text, is_error) = call(&server, search_call(json!({"objective": "o"})), &ctx).await;

        assert!(!is_error, "unexpected error: {}", text);
    }
}

mod http_transport_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parallel_search_mcp::mcp::http::create_router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_x_api_key_header_forwarded_upstream() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "client-header-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search_id": "h1",
                "results": [{"title": "Via header", "url": "https://h.example", "excerpts": ["x"]}]
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let router = create_router(server_for(&upstream, None, Duration::from_secs(5)));
        let request = Request::post("/mcp")
            .header("content-type", "application/json")
            .header("X-API-Key", "client-header-key")
            .body(Body::from(search_call(json!({"objective": "o"})).to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Search ID: h1"));
        assert!(text.contains("**Via header**"));
    }
}
