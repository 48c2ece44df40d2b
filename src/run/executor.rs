//! Caller-facing entry point for agent runs.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::driver::RunDriver;
use super::state::RunState;
use crate::completion::CompletionService;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::store::RunRecordStore;
use crate::tool_source::ToolSourceConnector;
use crate::tools::ToolResolver;
use crate::types::RunId;

/// Loads an agent and its tool source, then drives a run to completion.
///
/// Cheap to clone; clones share the same collaborators.
#[derive(Clone)]
pub struct AgentRunExecutor {
    store: Arc<dyn RunRecordStore>,
    resolver: Arc<ToolResolver>,
    driver: Arc<RunDriver>,
}

impl AgentRunExecutor {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn RunRecordStore>,
        completion: Arc<dyn CompletionService>,
        connector: Arc<dyn ToolSourceConnector>,
    ) -> Self {
        Self {
            driver: Arc::new(RunDriver::new(config, completion, store.clone())),
            resolver: Arc::new(ToolResolver::new(connector)),
            store,
        }
    }

    /// Executor wired to the HTTP store, HTTP completion service and MCP
    /// tool sources described by `config`.
    #[cfg(feature = "mcp")]
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        use crate::completion::HttpCompletionService;
        use crate::store::HttpRunStore;
        use crate::tool_source::mcp::McpToolSourceConnector;

        config.validate()?;
        let store = Arc::new(HttpRunStore::from_config(&config)?);
        let completion = Arc::new(HttpCompletionService::from_config(&config)?);
        let connector = Arc::new(McpToolSourceConnector::new(config.clone()));
        Ok(Self::new(config, store, completion, connector))
    }

    /// Execute one run and return its terminal record.
    ///
    /// Acquisition failures (missing agent or tool source, session that fails
    /// to open or list) return before any record is written. Once a session
    /// is open it is released on every path out of the run.
    pub async fn execute(
        &self,
        run_id: &str,
        agent_id: &str,
        project_id: &str,
        prompt: &str,
    ) -> Result<RunState> {
        let result = self.execute_inner(run_id, agent_id, project_id, prompt).await;
        if let Err(err) = &result {
            tracing::error!(
                run_id,
                agent_id,
                project_id,
                error = %err,
                acquisition = err.is_acquisition_failure(),
                "agent run failed"
            );
        }
        result
    }

    async fn execute_inner(
        &self,
        run_id: &str,
        agent_id: &str,
        project_id: &str,
        prompt: &str,
    ) -> Result<RunState> {
        let agent = self.store.get_agent(project_id, agent_id).await?;
        let source = self
            .store
            .get_tool_source(project_id, &agent.tool_source_id)
            .await?;

        let (tools, lease) = self.resolver.resolve(&agent, source).await?;
        let result = self
            .driver
            .run(run_id, &agent, &tools, lease.session(), prompt)
            .await;
        lease.release().await;
        result
    }

    /// Run `execute` on its own task. Errors are logged, not returned.
    pub fn spawn(
        &self,
        run_id: impl Into<RunId>,
        agent_id: impl Into<String>,
        project_id: impl Into<String>,
        prompt: impl Into<String>,
    ) -> JoinHandle<()> {
        let executor = self.clone();
        let run_id = run_id.into();
        let agent_id = agent_id.into();
        let project_id = project_id.into();
        let prompt = prompt.into();
        tokio::spawn(async move {
            // `execute` has already logged the failure.
            if executor
                .execute(&run_id, &agent_id, &project_id, &prompt)
                .await
                .is_err()
            {
                tracing::debug!(%run_id, "spawned agent run ended with an error");
            }
        })
    }

    /// Like [`spawn`](Self::spawn) with a freshly generated run id.
    pub fn spawn_new(
        &self,
        agent_id: impl Into<String>,
        project_id: impl Into<String>,
        prompt: impl Into<String>,
    ) -> (RunId, JoinHandle<()>) {
        let run_id = uuid::Uuid::new_v4().to_string();
        let handle = self.spawn(run_id.clone(), agent_id, project_id, prompt);
        (run_id, handle)
    }
}
