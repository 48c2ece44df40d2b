//! Run-record store: where agents and tool sources are loaded from and run
//! records are written to.

pub mod http;
pub mod memory;

pub use http::HttpRunStore;
pub use memory::InMemoryRunStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::run::RunState;
use crate::types::{AgentDefinition, ToolSource};

/// External store consumed by the executor and the progress publisher.
///
/// `upsert_run` is an idempotent overwrite keyed by run id; last write wins.
#[async_trait]
pub trait RunRecordStore: Send + Sync {
    async fn upsert_run(&self, state: &RunState) -> Result<()>;

    /// Fails with [`RunError::AgentNotFound`](crate::error::RunError::AgentNotFound).
    async fn get_agent(&self, project_id: &str, agent_id: &str) -> Result<AgentDefinition>;

    /// Fails with [`RunError::ToolSourceNotFound`](crate::error::RunError::ToolSourceNotFound).
    async fn get_tool_source(&self, project_id: &str, tool_source_id: &str)
        -> Result<ToolSource>;
}
