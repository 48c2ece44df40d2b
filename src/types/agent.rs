//! Agent definitions.

use std::str::FromStr;

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// An agent as authored by a user; loaded read-only for each run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentDefinition {
    #[builder(into)]
    pub id: String,
    #[builder(into)]
    pub project_id: String,
    #[builder(into, default)]
    #[serde(default)]
    pub system_prompt: String,
    /// Step ceiling handed to the completion service.
    pub max_steps: u32,
    #[builder(default)]
    #[serde(default)]
    pub output_mode: OutputMode,
    #[builder(into)]
    pub tool_source_id: String,
}

/// Shape of the final output an agent must produce.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputMode {
    /// No structured output; the completion tool takes no arguments.
    #[default]
    FreeForm,
    /// Completion tool arguments must carry these named fields.
    Structured { fields: Vec<OutputField> },
}

/// A named field of structured output.
///
/// The declared type is kept verbatim; only [`OutputFieldKind`] values get a
/// typed schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub declared_type: String,
}

impl OutputField {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            declared_type: declared_type.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Recognized kind, or `None` when the declared type is not supported.
    pub fn kind(&self) -> Option<OutputFieldKind> {
        OutputFieldKind::from_str(self.declared_type.trim()).ok()
    }
}

/// Output field types with a concrete JSON schema.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFieldKind {
    Text,
    Number,
    Boolean,
}
