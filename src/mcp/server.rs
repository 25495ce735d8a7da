//! MCP Server implementation
//!
//! Dispatches JSON-RPC messages to the tool handler. The same dispatcher
//! backs the stdio transport here and the HTTP transport in [`super::http`].

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Result;
use crate::mcp::tools::{CallContext, ToolHandler};
use crate::mcp::types::*;

/// MCP Server info
pub const SERVER_NAME: &str = "Parallel Search MCP";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "Use parallel_search to look things up on the web. Provide an \
objective, searchQueries, or both.";

/// MCP Server for Parallel Search
#[derive(Debug, Clone)]
pub struct McpServer {
    /// Tool handler
    tool_handler: ToolHandler,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tool_handler: ToolHandler) -> Self {
        Self { tool_handler }
    }

    /// Run the server on stdio, one JSON-RPC message per line
    pub async fn run_stdio(&self) -> Result<()> {
        tracing::info!("MCP server listening on stdio");
        self.run_lines(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;
        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC from `reader` until EOF
    ///
    /// A line that is not UTF-8 gets a parse error reply; only I/O failures
    /// end the loop.
    pub async fn run_lines<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let ctx = CallContext::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match String::from_utf8(std::mem::take(&mut buf)) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.handle_message(&line, &ctx).await
                }
                Err(e) => {
                    tracing::warn!("Discarding non UTF-8 message: {}", e);
                    Some(JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Message is not valid UTF-8: {}", e)),
                    ))
                }
            };

            if let Some(response) = response {
                let mut response_str = serde_json::to_string(&response)?;
                response_str.push('\n');
                writer.write_all(response_str.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a raw JSON-RPC message
    ///
    /// Returns `None` for notifications.
    pub async fn handle_message(&self, message: &str, ctx: &CallContext) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(v) => v,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        self.handle_value(value, ctx).await
    }

    /// Handle an already-parsed JSON-RPC message
    pub async fn handle_value(&self, value: Value, ctx: &CallContext) -> Option<JsonRpcResponse> {
        let id = value
            .get("id")
            .cloned()
            .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request, ctx).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(e.to_string()),
            )),
        }
    }

    /// Handle a JSON-RPC request or notification
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        ctx: &CallContext,
    ) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            if request.method == methods::INITIALIZED {
                tracing::debug!("Client initialized");
            } else {
                tracing::debug!(method = %request.method, "Ignoring notification");
            }
            return None;
        }

        tracing::debug!(method = %request.method, "Handling request");

        let response = match request.method.as_str() {
            methods::INITIALIZE => {
                match serde_json::to_value(self.handle_initialize(&request)) {
                    Ok(result) => JsonRpcResponse::success(request.id, result),
                    Err(e) => JsonRpcResponse::error(request.id, JsonRpcError::internal_error(e.to_string())),
                }
            }
            methods::PING => JsonRpcResponse::success(request.id, serde_json::json!({})),
            methods::LIST_TOOLS => {
                let result = ListToolsResult {
                    tools: self.tool_handler.list_tools(),
                };
                match serde_json::to_value(result) {
                    Ok(result) => JsonRpcResponse::success(request.id, result),
                    Err(e) => JsonRpcResponse::error(request.id, JsonRpcError::internal_error(e.to_string())),
                }
            }
            methods::CALL_TOOL => {
                let result = self.handle_call_tool(&request, ctx).await;
                match serde_json::to_value(result) {
                    Ok(result) => JsonRpcResponse::success(request.id, result),
                    Err(e) => JsonRpcResponse::error(request.id, JsonRpcError::internal_error(e.to_string())),
                }
            }
            _ => JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method)),
        };

        Some(response)
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: &JsonRpcRequest) -> InitializeResult {
        let params: InitializeParams = request
            .params
            .clone()
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        let protocol_version = negotiate_protocol_version(params.protocol_version.as_deref());
        tracing::info!(protocol_version, "Client connected");

        InitializeResult {
            protocol_version: protocol_version.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, request: &JsonRpcRequest, ctx: &CallContext) -> CallToolResult {
        let params: CallToolParams = match request.params.as_ref() {
            Some(p) => match serde_json::from_value(p.clone()) {
                Ok(params) => params,
                Err(e) => {
                    return CallToolResult::error(format!("Error: Invalid tool parameters: {}", e));
                }
            },
            None => return CallToolResult::error("Error: Missing tool parameters"),
        };

        tracing::info!(tool = %params.name, "Tool call");
        self.tool_handler
            .call_tool(&params.name, params.arguments, ctx)
            .await
    }
}
