//! Tool parameter schemas.

use serde::{Deserialize, Serialize};

/// JSON Schema-based parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AgentToolParameters {
    /// JSON Schema object describing the parameters.
    pub schema: serde_json::Value,
}

impl AgentToolParameters {
    /// Create from a raw JSON Schema value.
    pub fn from_schema(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// Create an empty parameter schema (no parameters).
    pub fn empty() -> Self {
        Self {
            schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
        }
    }

    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Names of the top-level properties.
    pub fn property_names(&self) -> Vec<&str> {
        self.schema
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    /// Add a string property.
    pub fn string(self, name: impl Into<String>, description: Option<&str>, required: bool) -> Self {
        self.typed(name, "string", description, required)
    }

    /// Add a number property.
    pub fn number(self, name: impl Into<String>, description: Option<&str>, required: bool) -> Self {
        self.typed(name, "number", description, required)
    }

    /// Add a boolean property.
    pub fn boolean(self, name: impl Into<String>, description: Option<&str>, required: bool) -> Self {
        self.typed(name, "boolean", description, required)
    }

    /// Add a property that accepts any JSON value.
    pub fn untyped(self, name: impl Into<String>, description: Option<&str>, required: bool) -> Self {
        let mut schema = serde_json::Map::new();
        if let Some(description) = description {
            schema.insert("description".into(), description.into());
        }
        self.property(name, serde_json::Value::Object(schema), required)
    }

    fn typed(
        self,
        name: impl Into<String>,
        json_type: &str,
        description: Option<&str>,
        required: bool,
    ) -> Self {
        let mut schema = serde_json::json!({ "type": json_type });
        if let Some(description) = description {
            schema["description"] = description.into();
        }
        self.property(name, schema, required)
    }

    fn property(mut self, name: impl Into<String>, schema: serde_json::Value, required: bool) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), schema);
        if required {
            self.required.push(name);
        }
        self
    }

    /// Build into AgentToolParameters.
    pub fn build(self) -> AgentToolParameters {
        AgentToolParameters {
            schema: serde_json::json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}
