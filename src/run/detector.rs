//! Decides the terminal status of a run whose stream ended normally.

use super::ledger::StepLedger;
use super::state::RunState;
use crate::error::Result;
use crate::tools::MARK_RUN_COMPLETE;

/// Outcome derived from a finished ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The agent called the completion tool with this input.
    Completed(serde_json::Value),
    Incomplete,
}

/// Scan the whole ledger for a completion call, regardless of position.
///
/// If the agent called the completion tool more than once, the first call in
/// ledger order wins.
pub fn detect(ledger: &StepLedger) -> Completion {
    match ledger.find_tool_call(MARK_RUN_COMPLETE) {
        Some(call) => Completion::Completed(call.input.clone()),
        None => Completion::Incomplete,
    }
}

/// Move `state` to its terminal status based on its ledger.
pub fn finalize(state: &mut RunState) -> Result<Completion> {
    let completion = detect(&state.steps);
    let message = state.steps.markdown_text();
    match &completion {
        Completion::Completed(output) => state.complete(output.clone(), message)?,
        Completion::Incomplete => state.fail(message)?,
    }
    Ok(completion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentDefinition, RunStatus, ToolCallBlock, ToolOrigin};
    use serde_json::json;

    fn state() -> RunState {
        let agent = AgentDefinition::builder()
            .id("agent-1")
            .project_id("proj-1")
            .max_steps(5)
            .tool_source_id("ts-1")
            .build();
        RunState::start("run-1", &agent)
    }

    #[test]
    fn completion_call_anywhere_completes_the_run() {
        let mut state = state();
        state
            .steps
            .begin_tool_call(ToolCallBlock::started(
                "c1",
                MARK_RUN_COMPLETE,
                ToolOrigin::Internal,
                json!({ "total": 42 }),
            ))
            .unwrap();
        state.steps.push_markdown("trailing notes");

        let outcome = finalize(&mut state).unwrap();
        assert_eq!(outcome, Completion::Completed(json!({ "total": 42 })));
        assert_eq!(state.status, RunStatus::Completed);
        assert_eq!(state.output, Some(json!({ "total": 42 })));
        assert_eq!(state.message, "trailing notes");
    }

    #[test]
    fn missing_completion_call_fails_the_run() {
        let mut state = state();
        state.steps.push_markdown("I gave up");
        state.steps.push_markdown("sorry");

        assert_eq!(finalize(&mut state).unwrap(), Completion::Incomplete);
        assert_eq!(state.status, RunStatus::Failed);
        assert_eq!(state.message, "I gave up\nsorry");
        assert!(state.output.is_none());
    }

    #[test]
    fn first_completion_call_wins() {
        let mut state = state();
        for (id, total) in [("c1", 1), ("c2", 2)] {
            state
                .steps
                .begin_tool_call(ToolCallBlock::started(
                    id,
                    MARK_RUN_COMPLETE,
                    ToolOrigin::Internal,
                    json!({ "total": total }),
                ))
                .unwrap();
        }
        assert_eq!(detect(&state.steps), Completion::Completed(json!({ "total": 1 })));
    }
}
