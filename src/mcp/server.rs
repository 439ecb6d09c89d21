//! MCP Server implementation
//!
//! Implements the Model Context Protocol server over a line-delimited
//! JSON-RPC stream (stdio in production).

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{McpError, Result};
use crate::mcp::dispatcher::{Dispatcher, ToolCall};
use crate::mcp::types::*;

/// MCP Server info
const SERVER_NAME: &str = "wikipedia-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handshake progress of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    AwaitingInitialize,
    Initializing,
    Ready,
}

/// MCP Server for Wikipedia
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run the server on stdio
    pub async fn run_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve one connection until end-of-stream
    ///
    /// Frames are handled strictly one at a time. A frame that is not valid
    /// JSON-RPC is answered with a parse error and ends the connection.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("Starting MCP server, waiting for JSON-RPC requests...");

        let mut session = Session::AwaitingInitialize;
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    tracing::error!(error = %e, "Malformed frame, closing connection");
                    let response = JsonRpcResponse::error(None, JsonRpcError::parse_error(e.to_string()));
                    write_frame(&mut writer, &response).await?;
                    return Err(McpError::MalformedFrame {
                        message: e.to_string(),
                    }
                    .into());
                }
            };

            if let Some(response) = self.handle_request(&mut session, request).await {
                write_frame(&mut writer, &response).await?;
            }
        }

        tracing::info!("MCP server shutting down (input closed)");
        Ok(())
    }

    /// Handle one decoded frame, returning the response to send if any
    async fn handle_request(
        &self,
        session: &mut Session,
        request: JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, id = ?request.id, "Received request");

        if request.is_notification() {
            self.handle_notification(session, &request);
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            methods::INITIALIZE => {
                *session = Session::Initializing;
                self.handle_initialize(id, request.params)
            }
            methods::PING => JsonRpcResponse::success(id, serde_json::json!({})),
            methods::LIST_TOOLS | methods::CALL_TOOL if *session != Session::Ready => {
                tracing::warn!(method = %request.method, ?session, "Request before handshake completed");
                JsonRpcResponse::error(id, JsonRpcError::not_initialized())
            }
            methods::LIST_TOOLS => self.handle_list_tools(id),
            methods::CALL_TOOL => self.handle_call_tool(id, request.params).await,
            _ => JsonRpcResponse::error(id, JsonRpcError::method_not_found(&request.method)),
        };

        Some(response)
    }

    fn handle_notification(&self, session: &mut Session, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED if *session == Session::Initializing => {
                *session = Session::Ready;
                tracing::info!("MCP session ready");
            }
            methods::INITIALIZED => {
                tracing::warn!(?session, "Initialized notification outside the handshake");
            }
            methods::CANCELLED => {
                tracing::debug!("Cancellation requested; calls run to completion");
            }
            other => tracing::debug!(method = %other, "Ignoring notification"),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: Option<RequestId>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = %client.version, "MCP client connected");
        }
        if let Some(version) = params.protocol_version.as_deref().filter(|v| *v != MCP_VERSION) {
            tracing::debug!(requested = version, offered = MCP_VERSION, "Protocol version mismatch");
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
        };

        respond(id, &result)
    }

    /// Handle list tools request
    fn handle_list_tools(&self, id: Option<RequestId>) -> JsonRpcResponse {
        let result = ListToolsResult {
            tools: self.dispatcher.catalog().tools(),
        };

        respond(id, &result)
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, id: Option<RequestId>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid tool parameters: {}", e)),
                )
            }
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing tool parameters"))
            }
        };

        let call = ToolCall::new(params.name, params.arguments);
        let result = self.dispatcher.dispatch(call).await;

        respond(id, &result.into_call_result())
    }
}

fn respond<T: Serialize>(id: Option<RequestId>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

async fn write_frame<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = serde_json::to_string(response)?;
    frame.push('\n');

    writer.write_all(frame.as_bytes()).await?;
    writer.flush().await?;

    tracing::debug!(response = %frame.trim_end(), "Sent response");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::error::WikiMcpError;
    use crate::mcp::catalog::ToolCatalog;
    use crate::wikipedia::stub::StubProvider;

    const INIT: &str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test","version":"1.0"},"capabilities":{}}}"#;
    const INITIALIZED: &str = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;

    fn server(stub: StubProvider) -> McpServer {
        let catalog = Arc::new(ToolCatalog::wikipedia().unwrap());
        McpServer::new(Dispatcher::new(catalog, Arc::new(stub)))
    }

    async fn run(server: &McpServer, input: &str) -> (Result<()>, Vec<Value>) {
        let mut output = Vec::new();
        let result = server.serve(input.as_bytes(), &mut output).await;
        let frames = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (result, frames)
    }

    #[tokio::test]
    async fn test_handshake_then_list() {
        let input = format!(
            "{}\n{}\n{}\n",
            INIT, INITIALIZED, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#
        );
        let (result, frames) = run(&server(StubProvider::default()), &input).await;

        assert!(result.is_ok());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["result"]["serverInfo"]["name"], "wikipedia-mcp");
        assert_eq!(frames[0]["result"]["protocolVersion"], MCP_VERSION);
        assert_eq!(frames[1]["id"], 2);
        assert_eq!(frames[1]["result"]["tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_calls_rejected_before_initialize() {
        let input = r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#;
        let (result, frames) = run(&server(StubProvider::default()), input).await;

        assert!(result.is_ok());
        assert_eq!(frames[0]["error"]["code"], error_codes::SERVER_NOT_INITIALIZED);
    }

    #[tokio::test]
    async fn test_call_tool_renders_text() {
        let stub = StubProvider::default().with_search(Ok(vec!["Rust".into()]));
        let input = format!(
            "{}\n{}\n{}\n",
            INIT,
            INITIALIZED,
            r#"{"jsonrpc":"2.0","id":"abc","method":"tools/call","params":{"name":"wikipedia_search","arguments":{"query":"rust"}}}"#
        );
        let (_, frames) = run(&server(stub), &input).await;

        assert_eq!(frames[1]["id"], "abc");
        assert_eq!(
            frames[1]["result"]["content"][0],
            serde_json::json!({"type": "text", "text": "Wikipedia search results for 'rust':\n\n1. Rust\n"})
        );
        assert!(frames[1]["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_calls_rejected_until_initialized_notification() {
        let stub = Arc::new(StubProvider::default().with_search(Ok(vec!["Rust".into()])));
        let catalog = Arc::new(ToolCatalog::wikipedia().unwrap());
        let server = McpServer::new(Dispatcher::new(catalog, stub.clone()));

        let input = format!(
            "{}\n{}\n{}\n",
            INIT,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"wikipedia_search","arguments":{"query":"rust"}}}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/list"}"#
        );
        let (result, frames) = run(&server, &input).await;

        assert!(result.is_ok());
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1]["error"]["code"], error_codes::SERVER_NOT_INITIALIZED);
        assert_eq!(frames[2]["error"]["code"], error_codes::SERVER_NOT_INITIALIZED);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_call_params_are_invalid_params() {
        let input = format!(
            "{}\n{}\n{}\n",
            INIT,
            INITIALIZED,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"arguments":{}}}"#
        );
        let (_, frames) = run(&server(StubProvider::default()), &input).await;

        assert_eq!(frames[1]["id"], 5);
        assert_eq!(frames[1]["error"]["code"], error_codes::INVALID_PARAMS);
        assert!(frames[1].get("result").is_none());
    }

    #[tokio::test]
    async fn test_null_id_gets_a_response() {
        let input = r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#;
        let (_, frames) = run(&server(StubProvider::default()), input).await;

        assert_eq!(frames.len(), 1);
        assert!(frames[0]["id"].is_null());
        assert_eq!(frames[0]["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_malformed_frame_ends_connection() {
        let input = format!(
            "{}\n{{not json\n{}\n",
            INIT, r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#
        );
        let (result, frames) = run(&server(StubProvider::default()), &input).await;

        assert!(matches!(result, Err(WikiMcpError::Mcp(McpError::MalformedFrame { .. }))));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1]["error"]["code"], error_codes::PARSE_ERROR);
        assert!(frames[1]["id"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let input = r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#;
        let (_, frames) = run(&server(StubProvider::default()), input).await;
        assert_eq!(frames[0]["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ping_over_mock_stream() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"ping\"}\n")
            .build();
        let writer = tokio_test::io::Builder::new()
            .write(b"{\"jsonrpc\":\"2.0\",\"id\":9,\"result\":{}}\n")
            .build();

        let result = server(StubProvider::default())
            .serve(BufReader::new(reader), writer)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_read_failure_ends_connection() {
        let reader = tokio_test::io::Builder::new()
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            .build();

        let result = server(StubProvider::default())
            .serve(BufReader::new(reader), Vec::new())
            .await;
        assert!(matches!(result, Err(WikiMcpError::Io(_))));
    }
}
