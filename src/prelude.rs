//! Convenience re-exports for common use.

pub use crate::completion::{CompletionEvent, CompletionRequest, CompletionService, StreamFault};
pub use crate::config::EngineConfig;
pub use crate::error::{Result, RunError};
pub use crate::run::{AgentRunExecutor, RunState};
pub use crate::store::{InMemoryRunStore, RunRecordStore};
pub use crate::tool_source::{ToolSourceConnector, ToolSourceSession};
pub use crate::types::{AgentDefinition, OutputMode, RunStatus, StepBlock, ToolSource};
