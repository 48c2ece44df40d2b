//! Tool sources: remote catalogs of callable tools, and tool origins.

use serde::{Deserialize, Serialize};

/// A remote catalog of tools an agent may call, served over a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolSource {
    pub id: String,
    #[serde(default)]
    pub tools: Vec<ToolSourceEntry>,
}

impl ToolSource {
    pub fn new(id: impl Into<String>, tools: Vec<ToolSourceEntry>) -> Self {
        Self {
            id: id.into(),
            tools,
        }
    }

    /// A source declaring no tools needs no session.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Catalog entry for a tool name.
    pub fn entry(&self, tool_name: &str) -> Option<&ToolSourceEntry> {
        self.tools.iter().find(|entry| entry.tool_name == tool_name)
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolSourceEntry {
    pub tool_name: String,
    pub origin: RemoteToolOrigin,
}

impl ToolSourceEntry {
    pub fn piece(tool_name: impl Into<String>, metadata: PieceToolMetadata) -> Self {
        Self {
            tool_name: tool_name.into(),
            origin: RemoteToolOrigin::Piece(metadata),
        }
    }

    pub fn flow(tool_name: impl Into<String>, metadata: FlowToolMetadata) -> Self {
        Self {
            tool_name: tool_name.into(),
            origin: RemoteToolOrigin::Flow(metadata),
        }
    }
}

/// Where a catalog tool is implemented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RemoteToolOrigin {
    /// An action of an integration service ("piece").
    Piece(PieceToolMetadata),
    /// A sub-workflow exposed as a tool.
    Flow(FlowToolMetadata),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PieceToolMetadata {
    pub piece_name: String,
    pub piece_version: String,
    pub action_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlowToolMetadata {
    pub flow_id: String,
    pub display_name: String,
}

/// Origin of a tool as recorded on a tool-call step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolOrigin {
    /// Implemented by this engine (e.g. the completion tool).
    Internal,
    Piece(PieceToolMetadata),
    Flow(FlowToolMetadata),
}

impl ToolOrigin {
    /// Human-readable label for dashboards, when the origin has one.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Internal => None,
            Self::Piece(meta) => Some(meta.display_name.as_deref().unwrap_or(&meta.action_name)),
            Self::Flow(meta) => Some(&meta.display_name),
        }
    }
}

impl From<RemoteToolOrigin> for ToolOrigin {
    fn from(origin: RemoteToolOrigin) -> Self {
        match origin {
            RemoteToolOrigin::Piece(meta) => Self::Piece(meta),
            RemoteToolOrigin::Flow(meta) => Self::Flow(meta),
        }
    }
}
