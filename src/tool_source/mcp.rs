//! Tool-source sessions over the Model Context Protocol.
//!
//! Each tool source is served as a streamable-HTTP MCP endpoint under the
//! engine's public URL (see [`EngineConfig::tool_source_url`]).

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ClientInfo, Content, JsonObject, ResourceContents,
};
use rmcp::service::{ClientInitializeError, RoleClient, RunningService, ServiceError};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::ServiceExt;
use tokio::sync::Mutex;

use super::{RemoteTool, ToolSourceConnector, ToolSourceSession};
use crate::config::EngineConfig;
use crate::error::{Result, RunError};
use crate::types::ToolSource;

type McpRunningService = RunningService<RoleClient, ClientInfo>;

/// Opens MCP sessions for tool sources.
#[derive(Debug, Clone)]
pub struct McpToolSourceConnector {
    config: EngineConfig,
}

impl McpToolSourceConnector {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolSourceConnector for McpToolSourceConnector {
    async fn open(&self, source: &ToolSource) -> Result<Arc<dyn ToolSourceSession>> {
        let url = self.config.tool_source_url(&source.id);
        tracing::debug!(tool_source_id = %source.id, %url, "connecting to MCP tool source");
        let transport = StreamableHttpClientTransport::from_uri(url);
        let service = ClientInfo::default()
            .serve(transport)
            .await
            .map_err(|e| map_client_initialize_error(&source.id, e))?;
        Ok(Arc::new(McpToolSourceSession {
            source_id: source.id.clone(),
            service: Mutex::new(Some(service)),
        }))
    }
}

/// A running MCP client session.
pub struct McpToolSourceSession {
    source_id: String,
    service: Mutex<Option<McpRunningService>>,
}

#[async_trait]
impl ToolSourceSession for McpToolSourceSession {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>> {
        let guard = self.service.lock().await;
        let service = guard.as_ref().ok_or_else(|| self.closed_error())?;

        let tools = match service.list_all_tools().await {
            Ok(tools) => tools,
            Err(ServiceError::UnexpectedResponse) => {
                service
                    .list_tools(None)
                    .await
                    .map_err(|e| self.service_error("list_tools", e))?
                    .tools
            }
            Err(e) => return Err(self.service_error("list_tools", e)),
        };

        Ok(tools.into_iter().map(map_mcp_tool).collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let arguments = coerce_tool_arguments(arguments)?;
        let guard = self.service.lock().await;
        let service = guard.as_ref().ok_or_else(|| self.closed_error())?;

        let result = service
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|e| self.service_error("call_tool", e))?;

        Ok(call_result_value(result))
    }

    async fn close(&self) -> Result<()> {
        let Some(service) = self.service.lock().await.take() else {
            return Ok(());
        };
        service
            .cancel()
            .await
            .map(|_| ())
            .map_err(|e| RunError::tool_source(&self.source_id, format!("MCP close failed: {e}")))
    }
}

impl McpToolSourceSession {
    fn closed_error(&self) -> RunError {
        RunError::tool_source(&self.source_id, "MCP session is closed")
    }

    fn service_error(&self, context: &str, error: ServiceError) -> RunError {
        let message = match error {
            ServiceError::McpError(error) => {
                format!("{context}: MCP error {}: {}", error.code.0, error.message)
            }
            ServiceError::TransportClosed => format!("{context}: MCP transport closed"),
            ServiceError::UnexpectedResponse => format!("{context}: unexpected MCP response"),
            ServiceError::Timeout { timeout } => {
                format!("{context}: MCP request timed out after {}ms", timeout.as_millis())
            }
            other => format!("{context}: MCP service error: {other}"),
        };
        RunError::tool_source(&self.source_id, message)
    }
}

fn map_mcp_tool(tool: rmcp::model::Tool) -> RemoteTool {
    RemoteTool {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
        input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
    }
}

fn coerce_tool_arguments(value: serde_json::Value) -> Result<Option<JsonObject>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        other => Err(RunError::InvalidState(format!(
            "MCP tool arguments must be a JSON object; got {other}"
        ))),
    }
}

fn extract_text_content(content: &[Content]) -> Option<String> {
    let mut lines = Vec::new();
    for item in content {
        if let Some(text) = item.as_text() {
            lines.push(text.text.clone());
            continue;
        }
        if let Some(resource) = item.as_resource() {
            if let ResourceContents::TextResourceContents { text, .. } = &resource.resource {
                lines.push(text.clone());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Structured content wins, then text, then the raw content list.
///
/// Error results are returned as values too: the model sees the failure as the
/// tool's output.
fn call_result_value(result: CallToolResult) -> serde_json::Value {
    let is_error = result.is_error.unwrap_or(false);
    let value = if let Some(structured) = result.structured_content.clone() {
        structured
    } else if let Some(text) = extract_text_content(&result.content) {
        serde_json::Value::String(text)
    } else {
        serde_json::Value::Array(
            result
                .content
                .iter()
                .filter_map(|item| serde_json::to_value(item).ok())
                .collect(),
        )
    };
    if is_error {
        serde_json::json!({ "error": value })
    } else {
        value
    }
}

fn map_client_initialize_error(source_id: &str, error: ClientInitializeError) -> RunError {
    let message = match error {
        ClientInitializeError::ConnectionClosed(context) => {
            format!("MCP initialize connection closed: {context}")
        }
        ClientInitializeError::JsonRpcError(error) => format!(
            "MCP initialize JSON-RPC error {}: {}",
            error.code.0, error.message
        ),
        ClientInitializeError::Cancelled => "MCP initialize cancelled".to_string(),
        other => format!("MCP initialize error: {other}"),
    };
    RunError::tool_source(source_id, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_mcp_tool_copies_fields() {
        let mut schema = serde_json::Map::new();
        schema.insert("type".into(), json!("object"));
        let tool = rmcp::model::Tool::new("weather", "lookup weather", schema);

        let mapped = map_mcp_tool(tool);
        assert_eq!(mapped.name, "weather");
        assert_eq!(mapped.description, "lookup weather");
        assert_eq!(mapped.input_schema["type"], "object");
    }

    #[test]
    fn coerce_tool_arguments_rejects_non_object() {
        assert!(coerce_tool_arguments(json!(["bad"])).is_err());
        assert!(coerce_tool_arguments(json!(null)).unwrap().is_none());
    }

    #[test]
    fn error_call_results_are_wrapped() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{ "type": "text", "text": "tool failed at runtime" }],
            "isError": true
        }))
        .expect("fixture call result should deserialize");

        assert_eq!(
            call_result_value(result),
            json!({ "error": "tool failed at runtime" })
        );
    }

    #[test]
    fn initialize_errors_name_the_source() {
        let err = map_client_initialize_error("ts-9", ClientInitializeError::Cancelled);
        assert!(err.is_acquisition_failure());
        assert!(err.to_string().contains("ts-9"));
    }
}
