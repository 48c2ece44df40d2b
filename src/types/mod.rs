//! Core types: agent definitions, tool sources, run records.

pub mod agent;
pub mod run;
pub mod tool_source;

pub use agent::*;
pub use run::*;
pub use tool_source::*;
