//! Error types for agent runs.

use thiserror::Error;

/// Primary error type for all agent-run operations.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Tool source not found: {0}")]
    ToolSourceNotFound(String),

    #[error("Tool source error: {source_id}: {message}")]
    ToolSource { source_id: String, message: String },

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Run store error: {0}")]
    Store(String),

    #[error("Tool result references unknown call id '{0}'")]
    UnknownCallId(String),

    #[error("Duplicate tool result for call id '{0}'")]
    DuplicateToolResult(String),

    #[error("Duplicate tool call id '{0}'")]
    DuplicateCallId(String),

    #[error("Tool '{0}' is not a built-in and is missing from the tool source catalog")]
    UnknownTool(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl RunError {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool-source error for a given source id.
    pub fn tool_source(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolSource {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// The event stream and the ledger have desynchronized.
    ///
    /// These are never recovered from: the run is recorded as failed and the
    /// error is returned to the caller.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownCallId(_)
                | Self::DuplicateToolResult(_)
                | Self::DuplicateCallId(_)
                | Self::UnknownTool(_)
                | Self::InvalidState(_)
        )
    }

    /// The run could not be started; no run record exists for it.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            Self::AgentNotFound(_) | Self::ToolSourceNotFound(_) | Self::ToolSource { .. }
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RunError>;
