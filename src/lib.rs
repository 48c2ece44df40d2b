//! Agent Runs: agent run orchestration engine
//!
//! Drives an AI agent through a bounded sequence of reasoning and tool-call
//! rounds until it calls `mark_run_complete` or runs out of steps, writing a
//! durable run record after every step.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_runs::prelude::*;
//!
//! # async fn example(
//! #     completion: Arc<dyn CompletionService>,
//! #     connector: Arc<dyn ToolSourceConnector>,
//! # ) -> agent_runs::error::Result<()> {
//! let config = EngineConfig::load()?;
//! let store = Arc::new(InMemoryRunStore::new());
//! let executor = AgentRunExecutor::new(config, store.clone(), completion, connector);
//!
//! let state = executor
//!     .execute("run-1", "agent-1", "project-1", "Summarize open tickets")
//!     .await?;
//! println!("{} {}", state.status, state.message);
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod prelude;
pub mod run;
pub mod store;
pub mod tool_source;
pub mod tools;
pub mod types;
