//! In-process store keeping every published record.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::RunRecordStore;
use crate::error::{Result, RunError};
use crate::run::RunState;
use crate::types::{AgentDefinition, ToolSource};

#[derive(Debug, Default)]
struct Inner {
    runs: HashMap<String, Vec<RunState>>,
    agents: HashMap<(String, String), AgentDefinition>,
    tool_sources: HashMap<(String, String), ToolSource>,
}

/// Store backed by process memory.
///
/// Besides the latest record per run it keeps every upsert in order, so the
/// full publish history of a run can be inspected.
#[derive(Debug, Default)]
pub struct InMemoryRunStore {
    inner: Mutex<Inner>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| RunError::Store("in-memory store lock poisoned".into()))
    }

    pub fn insert_agent(&self, agent: AgentDefinition) -> Result<()> {
        let key = (agent.project_id.clone(), agent.id.clone());
        self.lock()?.agents.insert(key, agent);
        Ok(())
    }

    pub fn insert_tool_source(&self, project_id: &str, source: ToolSource) -> Result<()> {
        let key = (project_id.to_string(), source.id.clone());
        self.lock()?.tool_sources.insert(key, source);
        Ok(())
    }

    /// Latest record of a run.
    pub fn run(&self, run_id: &str) -> Result<Option<RunState>> {
        Ok(self
            .lock()?
            .runs
            .get(run_id)
            .and_then(|history| history.last().cloned()))
    }

    /// Every record written for a run, oldest first.
    pub fn history(&self, run_id: &str) -> Result<Vec<RunState>> {
        Ok(self.lock()?.runs.get(run_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl RunRecordStore for InMemoryRunStore {
    async fn upsert_run(&self, state: &RunState) -> Result<()> {
        self.lock()?
            .runs
            .entry(state.run_id.clone())
            .or_default()
            .push(state.clone());
        Ok(())
    }

    async fn get_agent(&self, project_id: &str, agent_id: &str) -> Result<AgentDefinition> {
        self.lock()?
            .agents
            .get(&(project_id.to_string(), agent_id.to_string()))
            .cloned()
            .ok_or_else(|| RunError::AgentNotFound(agent_id.to_string()))
    }

    async fn get_tool_source(&self, project_id: &str, tool_source_id: &str) -> Result<ToolSource> {
        self.lock()?
            .tool_sources
            .get(&(project_id.to_string(), tool_source_id.to_string()))
            .cloned()
            .ok_or_else(|| RunError::ToolSourceNotFound(tool_source_id.to_string()))
    }
}
