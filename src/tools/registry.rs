//! Tool resolution: merge built-in and remote tools, classify tool origins.

use std::sync::Arc;

use tracing::{debug, warn};

use super::builtin::{builtin_tools, is_builtin};
use super::tool::ToolDefinition;
use super::types::AgentToolParameters;
use crate::error::{Result, RunError};
use crate::tool_source::{RemoteTool, ToolSourceConnector, ToolSourceLease};
use crate::types::{AgentDefinition, ToolOrigin, ToolSource};

/// Ordered set of tool definitions with unique names.
///
/// Inserting a tool whose name is already present replaces the existing
/// definition in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSet {
    tools: Vec<ToolDefinition>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tool; returns the definition it replaced, if any.
    pub fn insert(&mut self, tool: ToolDefinition) -> Option<ToolDefinition> {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(slot) => Some(std::mem::replace(slot, tool)),
            None => {
                self.tools.push(tool);
                None
            }
        }
    }

    pub fn extend(&mut self, tools: impl IntoIterator<Item = ToolDefinition>) {
        for tool in tools {
            self.insert(tool);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Maps tool names to their origin using the tool source catalog.
#[derive(Debug, Clone)]
pub struct ToolClassifier {
    catalog: Arc<ToolSource>,
}

impl ToolClassifier {
    pub fn new(catalog: Arc<ToolSource>) -> Self {
        Self { catalog }
    }

    /// Origin of a called tool.
    ///
    /// Built-ins are `Internal`. Every other name must be in the catalog; a
    /// miss means the model called a tool the run never offered.
    pub fn classify(&self, tool_name: &str) -> Result<ToolOrigin> {
        if is_builtin(tool_name) {
            return Ok(ToolOrigin::Internal);
        }
        self.catalog
            .entry(tool_name)
            .map(|entry| ToolOrigin::from(entry.origin.clone()))
            .ok_or_else(|| RunError::UnknownTool(tool_name.to_string()))
    }
}

/// Tools resolved for one run.
#[derive(Debug, Clone)]
pub struct ResolvedTools {
    pub tools: ToolSet,
    pub classifier: ToolClassifier,
}

/// Resolves the callable tool set for an agent.
pub struct ToolResolver {
    connector: Arc<dyn ToolSourceConnector>,
}

impl ToolResolver {
    pub fn new(connector: Arc<dyn ToolSourceConnector>) -> Self {
        Self { connector }
    }

    /// Resolve tools for `agent` and open its tool-source session.
    ///
    /// A source that declares no tools gets no session. Otherwise the session
    /// is opened and its tools merged first, so built-ins win name collisions.
    /// If listing fails the session is released before the error is returned.
    pub async fn resolve(
        &self,
        agent: &AgentDefinition,
        source: ToolSource,
    ) -> Result<(ResolvedTools, ToolSourceLease)> {
        let mut tools = ToolSet::new();

        let lease = if source.is_empty() {
            debug!(
                agent_id = %agent.id,
                tool_source_id = %source.id,
                "tool source declares no tools, skipping session"
            );
            ToolSourceLease::empty()
        } else {
            let lease = ToolSourceLease::acquire(self.connector.as_ref(), &source).await?;
            match list_remote_tools(&lease, &source.id).await {
                Ok(remote) => tools.extend(remote.into_iter().map(remote_definition)),
                Err(err) => {
                    lease.release().await;
                    return Err(err);
                }
            }
            lease
        };

        for builtin in builtin_tools(agent) {
            if let Some(shadowed) = tools.insert(builtin) {
                warn!(
                    agent_id = %agent.id,
                    tool = %shadowed.name,
                    "remote tool shadowed by built-in"
                );
            }
        }

        debug!(agent_id = %agent.id, tools = ?tools.names(), "tools resolved");
        Ok((
            ResolvedTools {
                tools,
                classifier: ToolClassifier::new(Arc::new(source)),
            },
            lease,
        ))
    }
}

async fn list_remote_tools(lease: &ToolSourceLease, source_id: &str) -> Result<Vec<RemoteTool>> {
    let Some(session) = lease.session() else {
        return Ok(Vec::new());
    };
    session.list_tools().await.map_err(|err| match err {
        RunError::ToolSource { .. } => err,
        other => RunError::tool_source(source_id, other.to_string()),
    })
}

fn remote_definition(tool: RemoteTool) -> ToolDefinition {
    ToolDefinition::session(
        tool.name,
        tool.description,
        AgentToolParameters::from_schema(tool.input_schema),
    )
}
