//! Built-in tools every agent run carries.
//!
//! Currently a single tool, [`MARK_RUN_COMPLETE`]. The model calls it to end
//! the run; its arguments become the run's output. For structured agents the
//! argument schema mirrors the declared output fields.

use crate::tools::tool::ToolDefinition;
use crate::tools::types::{AgentToolParameters, ParameterBuilder};
use crate::types::{AgentDefinition, OutputField, OutputFieldKind, OutputMode};

/// Name of the completion tool.
pub const MARK_RUN_COMPLETE: &str = "mark_run_complete";

const MARK_RUN_COMPLETE_DESCRIPTION: &str =
    "Mark the run as complete. Call this exactly once, after all other work is done.";

/// Whether a tool name is implemented by this engine.
pub fn is_builtin(name: &str) -> bool {
    name == MARK_RUN_COMPLETE
}

/// All built-in tools for an agent.
pub fn builtin_tools(agent: &AgentDefinition) -> Vec<ToolDefinition> {
    vec![mark_run_complete_tool(&agent.output_mode)]
}

/// The completion tool for a given output mode.
pub fn mark_run_complete_tool(mode: &OutputMode) -> ToolDefinition {
    ToolDefinition::builtin(
        MARK_RUN_COMPLETE,
        MARK_RUN_COMPLETE_DESCRIPTION,
        output_parameters(mode),
    )
}

/// Argument schema of the completion tool.
///
/// Free-form agents take no arguments. Structured agents require every
/// declared field; fields with an unrecognized type accept any value.
pub fn output_parameters(mode: &OutputMode) -> AgentToolParameters {
    match mode {
        OutputMode::FreeForm => AgentToolParameters::empty(),
        OutputMode::Structured { fields } => fields
            .iter()
            .fold(AgentToolParameters::object(), |builder, field| {
                add_field(builder, field)
            })
            .build(),
    }
}

fn add_field(builder: ParameterBuilder, field: &OutputField) -> ParameterBuilder {
    let description = field.description.as_deref();
    match field.kind() {
        Some(OutputFieldKind::Text) => builder.string(&field.name, description, true),
        Some(OutputFieldKind::Number) => builder.number(&field.name, description, true),
        Some(OutputFieldKind::Boolean) => builder.boolean(&field.name, description, true),
        None => {
            tracing::debug!(
                field = %field.name,
                declared_type = %field.declared_type,
                "unrecognized output field type, using untyped schema"
            );
            builder.untyped(&field.name, description, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn free_form_completion_tool_takes_no_arguments() {
        let tool = mark_run_complete_tool(&OutputMode::FreeForm);
        assert_eq!(tool.name, MARK_RUN_COMPLETE);
        assert!(tool.is_builtin());
        assert!(tool.parameters.property_names().is_empty());
    }

    #[test]
    fn structured_fields_become_required_typed_properties() {
        let mode = OutputMode::Structured {
            fields: vec![
                OutputField::new("total", "number").with_description("Order total"),
                OutputField::new("summary", "text"),
                OutputField::new("urgent", "boolean"),
            ],
        };
        let schema = output_parameters(&mode).schema;

        assert_eq!(schema["properties"]["total"]["type"], "number");
        assert_eq!(schema["properties"]["total"]["description"], "Order total");
        assert_eq!(schema["properties"]["summary"]["type"], "string");
        assert_eq!(schema["properties"]["urgent"]["type"], "boolean");
        assert_eq!(schema["required"], json!(["total", "summary", "urgent"]));
    }

    #[test]
    fn unknown_field_type_degrades_to_open_schema() {
        let mode = OutputMode::Structured {
            fields: vec![OutputField::new("due", "date")],
        };
        let schema = output_parameters(&mode).schema;
        assert_eq!(schema["properties"]["due"], json!({}));
        assert_eq!(schema["required"], json!(["due"]));
    }

    #[test]
    fn only_the_completion_tool_is_builtin() {
        assert!(is_builtin(MARK_RUN_COMPLETE));
        assert!(!is_builtin("slack_send_message"));
    }
}
