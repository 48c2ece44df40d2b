//! Effective system prompt for a run.

use chrono::NaiveDate;

use crate::tools::MARK_RUN_COMPLETE;
use crate::types::AgentDefinition;

/// Fixed preamble followed by the agent's own system prompt.
pub fn system_prompt(agent: &AgentDefinition, today: NaiveDate) -> String {
    let preamble = format!(
        "Today's date is {today}.\n\
         You are an autonomous agent working through a task step by step, calling tools as needed.\n\
         You MUST always finish by calling the `{MARK_RUN_COMPLETE}` tool. A run that ends \
         without calling it is considered failed."
    );
    if agent.system_prompt.trim().is_empty() {
        preamble
    } else {
        format!("{preamble}\n\n{}", agent.system_prompt)
    }
}
