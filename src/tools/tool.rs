//! Tool definitions handed to the completion service.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::types::AgentToolParameters;

/// Where invocations of a tool are routed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolBinding {
    /// Implemented by this engine.
    Builtin,
    /// Invoked through the run's tool-source session.
    Session,
}

/// A callable tool as advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (must match what the model calls).
    pub name: String,
    pub description: String,
    pub parameters: AgentToolParameters,
    pub binding: ToolBinding,
}

impl ToolDefinition {
    pub fn builtin(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            binding: ToolBinding::Builtin,
        }
    }

    pub fn session(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            binding: ToolBinding::Session,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.binding == ToolBinding::Builtin
    }
}
