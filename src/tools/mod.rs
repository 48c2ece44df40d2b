//! Tool system: definitions, built-ins and resolution.

pub mod builtin;
pub mod registry;
pub mod tool;
pub mod types;

pub use builtin::MARK_RUN_COMPLETE;
pub use registry::{ResolvedTools, ToolClassifier, ToolResolver, ToolSet};
pub use tool::{ToolBinding, ToolDefinition};
pub use types::{AgentToolParameters, ParameterBuilder};
