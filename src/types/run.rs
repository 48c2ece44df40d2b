//! Run record types: statuses and ledger steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::tool_source::ToolOrigin;

/// Run identifier, assigned by the caller.
pub type RunId = String;

/// Run lifecycle status.
///
/// Only `InProgress → Completed` and `InProgress → Failed` are legal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    InProgress,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Status of a single tool-call step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolCallStatus {
    InProgress,
    Completed,
}

/// One entry of the step ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StepBlock {
    Markdown { text: String },
    ToolCall(ToolCallBlock),
}

impl StepBlock {
    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Markdown { text: text.into() }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCallBlock> {
        match self {
            Self::ToolCall(block) => Some(block),
            Self::Markdown { .. } => None,
        }
    }

    pub fn as_markdown(&self) -> Option<&str> {
        match self {
            Self::Markdown { text } => Some(text),
            Self::ToolCall(_) => None,
        }
    }
}

/// A tool invocation requested by the model, and its result once known.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallBlock {
    pub call_id: String,
    pub tool_name: String,
    pub origin: ToolOrigin,
    pub input: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    pub status: ToolCallStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ToolCallBlock {
    /// A freshly requested call, not yet resolved.
    pub fn started(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        origin: ToolOrigin,
        input: serde_json::Value,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            origin,
            input,
            output: None,
            status: ToolCallStatus::InProgress,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ToolCallStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statuses_use_screaming_case_on_the_wire() {
        assert_eq!(serde_json::to_value(RunStatus::InProgress).unwrap(), "IN_PROGRESS");
        assert_eq!(RunStatus::Failed.to_string(), "FAILED");
        assert_eq!("COMPLETED".parse::<RunStatus>().unwrap(), RunStatus::Completed);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }

    #[test]
    fn tool_call_block_serializes_with_kind_tag() {
        let block = StepBlock::ToolCall(ToolCallBlock::started(
            "call-1",
            "mark_run_complete",
            ToolOrigin::Internal,
            json!({}),
        ));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool-call");
        assert_eq!(value["callId"], "call-1");
        assert_eq!(value["origin"]["type"], "internal");
        assert_eq!(value["status"], "IN_PROGRESS");
        assert!(value.get("output").is_none());
        assert!(value.get("endTime").is_none());
    }

    #[test]
    fn markdown_block_serializes_with_kind_tag() {
        let value = serde_json::to_value(StepBlock::markdown("hi")).unwrap();
        assert_eq!(value, json!({ "type": "markdown", "text": "hi" }));
    }
}
