//! Streamed completion service consumed by the run driver.

pub mod http;

pub use http::HttpCompletionService;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Result, RunError};
use crate::tool_source::ToolSourceSession;
use crate::tools::ToolDefinition;

/// Stream of events for one run.
pub type CompletionStream = BoxStream<'static, CompletionEvent>;

/// An event emitted by the completion service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum CompletionEvent {
    TextDelta {
        text: String,
    },
    ToolCall {
        call_id: String,
        tool_name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    ToolResult {
        call_id: String,
        #[serde(default)]
        output: serde_json::Value,
    },
    Error {
        cause: StreamFault,
    },
}

impl CompletionEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    pub fn tool_call(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self::ToolCall {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            input,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, output: serde_json::Value) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            output,
        }
    }

    pub fn error(cause: StreamFault) -> Self {
        Self::Error { cause }
    }
}

/// Classified failure kinds reported by the completion service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UpstreamFailureKind {
    RateLimited,
    Overloaded,
    Authentication,
    InvalidRequest,
    ContextLength,
    Provider,
}

/// A failure the completion service classified and described.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpstreamFailure {
    pub kind: UpstreamFailureKind,
    pub message: String,
}

/// Cause of a stream error event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StreamFault {
    /// Structured failure with a human-readable message.
    Upstream(UpstreamFailure),
    /// Any other error shape, kept raw.
    Opaque(serde_json::Value),
}

impl StreamFault {
    pub fn upstream(kind: UpstreamFailureKind, message: impl Into<String>) -> Self {
        Self::Upstream(UpstreamFailure {
            kind,
            message: message.into(),
        })
    }

    /// Classify a failure to open the stream.
    pub fn from_open_error(err: &RunError) -> Self {
        let kind = match err {
            RunError::Api { status, .. } => match status {
                429 => UpstreamFailureKind::RateLimited,
                401 | 403 => UpstreamFailureKind::Authentication,
                400 | 422 => UpstreamFailureKind::InvalidRequest,
                503 | 529 => UpstreamFailureKind::Overloaded,
                _ => UpstreamFailureKind::Provider,
            },
            RunError::Completion(_) => UpstreamFailureKind::Provider,
            other => return Self::Opaque(serde_json::json!({ "error": other.to_string() })),
        };
        let message = match err {
            RunError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::upstream(kind, message)
    }

    /// Run message for a run that failed with this fault.
    ///
    /// Upstream failures report their own message. Opaque faults are appended
    /// to whatever markdown the run produced so far.
    pub fn run_message(&self, markdown: &str) -> String {
        match self {
            Self::Upstream(failure) => failure.message.clone(),
            Self::Opaque(raw) => {
                let dump = serde_json::to_string(raw).unwrap_or_else(|_| raw.to_string());
                if markdown.is_empty() {
                    dump
                } else {
                    format!("{markdown}\n{dump}")
                }
            }
        }
    }
}

/// Request to start a streamed completion.
#[derive(Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub tools: Vec<ToolDefinition>,
    /// Maximum reasoning/tool rounds; the service ends the stream past it.
    pub step_ceiling: u32,
    /// Session through which session-bound tools are invoked.
    pub session: Option<Arc<dyn ToolSourceSession>>,
    /// Public endpoint of the same tool source, for out-of-process services.
    pub tool_source_url: Option<String>,
}

impl fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("system_prompt", &self.system_prompt)
            .field("user_prompt", &self.user_prompt)
            .field("tools", &self.tools.iter().map(|t| &t.name).collect::<Vec<_>>())
            .field("step_ceiling", &self.step_ceiling)
            .field("session", &self.session.as_ref().map(|s| s.source_id().to_string()))
            .field("tool_source_url", &self.tool_source_url)
            .finish()
    }
}

/// A service that reasons, invokes tools and streams events back.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Open a stream. Errors here mean the stream never started.
    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream>;
}
