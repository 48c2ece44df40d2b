//! Ordered step history of a run.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunError};
use crate::types::{StepBlock, ToolCallBlock, ToolCallStatus};

/// Append-only list of step blocks.
///
/// The one in-place mutation allowed is resolving a tool-call block with its
/// output, which happens at most once per call id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StepLedger {
    blocks: Vec<StepBlock>,
}

impl StepLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_markdown(&mut self, text: impl Into<String>) {
        self.blocks.push(StepBlock::markdown(text));
    }

    /// Append an in-progress tool-call block.
    pub fn begin_tool_call(&mut self, block: ToolCallBlock) -> Result<()> {
        if self.tool_call(&block.call_id).is_some() {
            return Err(RunError::DuplicateCallId(block.call_id));
        }
        self.blocks.push(StepBlock::ToolCall(block));
        Ok(())
    }

    /// Record the output of a previously begun tool call.
    pub fn resolve_tool_call(&mut self, call_id: &str, output: serde_json::Value) -> Result<()> {
        let block = self
            .blocks
            .iter_mut()
            .find_map(|b| match b {
                StepBlock::ToolCall(call) if call.call_id == call_id => Some(call),
                _ => None,
            })
            .ok_or_else(|| RunError::UnknownCallId(call_id.to_string()))?;

        if block.is_completed() {
            return Err(RunError::DuplicateToolResult(call_id.to_string()));
        }
        block.output = Some(output);
        block.status = ToolCallStatus::Completed;
        block.end_time = Some(Utc::now());
        Ok(())
    }

    pub fn tool_call(&self, call_id: &str) -> Option<&ToolCallBlock> {
        self.blocks
            .iter()
            .filter_map(StepBlock::as_tool_call)
            .find(|call| call.call_id == call_id)
    }

    /// First tool-call block for `tool_name`, anywhere in the ledger.
    pub fn find_tool_call(&self, tool_name: &str) -> Option<&ToolCallBlock> {
        self.blocks
            .iter()
            .filter_map(StepBlock::as_tool_call)
            .find(|call| call.tool_name == tool_name)
    }

    /// Text of every markdown block in ledger order, newline-joined.
    pub fn markdown_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(StepBlock::as_markdown)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn blocks(&self) -> &[StepBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolOrigin;
    use serde_json::json;

    fn call(id: &str, name: &str) -> ToolCallBlock {
        ToolCallBlock::started(id, name, ToolOrigin::Internal, json!({}))
    }

    #[test]
    fn resolve_completes_matching_block() {
        let mut ledger = StepLedger::new();
        ledger.push_markdown("thinking");
        ledger.begin_tool_call(call("c1", "search")).unwrap();
        ledger.resolve_tool_call("c1", json!({ "hits": 3 })).unwrap();

        let block = ledger.tool_call("c1").unwrap();
        assert_eq!(block.status, ToolCallStatus::Completed);
        assert_eq!(block.output, Some(json!({ "hits": 3 })));
        assert!(block.end_time.is_some());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn second_result_for_same_call_is_rejected() {
        let mut ledger = StepLedger::new();
        ledger.begin_tool_call(call("c1", "search")).unwrap();
        ledger.resolve_tool_call("c1", json!(1)).unwrap();

        let err = ledger.resolve_tool_call("c1", json!(2)).unwrap_err();
        assert!(matches!(err, RunError::DuplicateToolResult(id) if id == "c1"));
        assert_eq!(ledger.tool_call("c1").unwrap().output, Some(json!(1)));
    }

    #[test]
    fn unknown_call_id_is_rejected() {
        let mut ledger = StepLedger::new();
        let err = ledger.resolve_tool_call("nope", json!(null)).unwrap_err();
        assert!(matches!(err, RunError::UnknownCallId(_)));
    }

    #[test]
    fn duplicate_call_id_is_rejected() {
        let mut ledger = StepLedger::new();
        ledger.begin_tool_call(call("c1", "a")).unwrap();
        assert!(ledger.begin_tool_call(call("c1", "b")).is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn markdown_text_joins_in_order() {
        let mut ledger = StepLedger::new();
        ledger.push_markdown("one");
        ledger.begin_tool_call(call("c1", "a")).unwrap();
        ledger.push_markdown("two");
        assert_eq!(ledger.markdown_text(), "one\ntwo");
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut ledger = StepLedger::new();
        ledger.push_markdown("hi");
        assert_eq!(
            serde_json::to_value(&ledger).unwrap(),
            json!([{ "type": "markdown", "text": "hi" }])
        );
    }
}
