//! MCP (Model Context Protocol) server over newline-delimited JSON-RPC on stdio

use crate::error::ToolError;
use crate::shutdown::Shutdown;
use crate::tool::{DocSummaryTool, TOOL_NAME, input_schema};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "doc-summary";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;

/// JSON-RPC 2.0 request
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

impl From<(Option<Value>, ToolError)> for JsonRpcResponse {
    fn from((id, err): (Option<Value>, ToolError)) -> Self {
        JsonRpcResponse::error(id, err.code(), err.to_string())
    }
}

/// Serves the documentation summary tool to one MCP host
pub struct McpServer {
    tool: DocSummaryTool,
}

impl McpServer {
    pub fn new(tool: DocSummaryTool) -> Self {
        Self { tool }
    }

    /// Handle one request line; `None` means nothing is written back
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                ::log::warn!("Unparsable request: {}", e);
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                return serde_json::to_string(&response).ok();
            }
        };

        // Notifications carry no id and get no response
        if request.id.is_none() {
            ::log::debug!("Notification: {}", request.method);
            return None;
        }

        let response = self.handle_request(request).await;
        match serde_json::to_string(&response) {
            Ok(json) => Some(json),
            Err(e) => {
                ::log::error!("Failed to serialize response: {}", e);
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        ::log::debug!("Request: {}", request.method);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "tools": [{
                    "name": TOOL_NAME,
                    "description": self.tool.description(),
                    "inputSchema": input_schema()
                }]
            }),
        )
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        if tool_name != TOOL_NAME {
            let err = ToolError::InvalidArguments(format!("Unknown tool: {}", tool_name));
            return (id, err).into();
        }

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let result = match self.tool.call(arguments).await {
            Ok(result) => result,
            Err(e) => {
                ::log::error!("{} failed: {}", TOOL_NAME, e);
                return (id, e).into();
            }
        };

        match serde_json::to_string_pretty(&result) {
            Ok(text) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{
                        "type": "text",
                        "text": text
                    }]
                }),
            ),
            Err(e) => (id, ToolError::Internal(format!("serializing result: {}", e))).into(),
        }
    }

    /// Read requests from `reader` until EOF or shutdown, one at a time
    pub async fn serve<R, W>(
        &self,
        reader: R,
        mut writer: W,
        mut shutdown: Shutdown,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        ::log::info!("MCP server ready on stdio");

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = shutdown.wait() => {
                    ::log::info!("Shutdown requested, no longer accepting requests");
                    break;
                }
            };

            let Some(line) = line else {
                ::log::info!("Input closed, stopping server");
                break;
            };

            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }

            if shutdown.is_triggered() {
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_response(line: &str) -> Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_error_response_shape() {
        let response = JsonRpcResponse::error(Some(json!(7)), -32602, "bad");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({ "jsonrpc": "2.0", "id": 7, "error": { "code": -32602, "message": "bad" } })
        );
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_tool_error_conversion() {
        let response: JsonRpcResponse =
            (Some(json!("a")), ToolError::Internal("crawl failed".into())).into();
        let value = parse_response(&serde_json::to_string(&response).unwrap());
        assert_eq!(value["error"]["code"], json!(-32603));
        assert_eq!(value["id"], json!("a"));
    }

    #[test]
    fn test_parse_error_has_null_id() {
        let response = JsonRpcResponse::error(None, PARSE_ERROR, "Parse error");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], Value::Null);
    }
}
