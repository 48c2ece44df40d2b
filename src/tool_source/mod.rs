//! Remote tool sources: sessions, connectors and session lifecycle.

pub mod lifecycle;
#[cfg(feature = "mcp")]
pub mod mcp;

pub use lifecycle::ToolSourceLease;
#[cfg(feature = "mcp")]
pub use mcp::McpToolSourceConnector;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ToolSource;

/// A tool advertised by an open tool-source session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// An open session against a tool source.
///
/// The engine only lists tools and closes the session; `call_tool` is used by
/// the completion service that receives the session handle.
#[async_trait]
pub trait ToolSourceSession: Send + Sync {
    /// Id of the tool source this session serves.
    fn source_id(&self) -> &str;

    async fn list_tools(&self) -> Result<Vec<RemoteTool>>;

    async fn call_tool(&self, name: &str, arguments: serde_json::Value)
        -> Result<serde_json::Value>;

    async fn close(&self) -> Result<()>;
}

/// Opens sessions against tool sources.
#[async_trait]
pub trait ToolSourceConnector: Send + Sync {
    async fn open(&self, source: &ToolSource) -> Result<Arc<dyn ToolSourceSession>>;
}
