//! Tool definitions advertised by `tools/list`.
//!
//! Input schemas are built from the crate's own schema types and checked
//! with the same engine before any handler sees the arguments.

use serde::Serialize;

use crate::schema::{
    validate, ArraySchema, BooleanSchema, CombinedSchema, ObjectSchema, SchemaError, SchemaNode,
    StringSchema, ValidationErrors,
};

pub const VALIDATE_TOOL: &str = "schema.validate";
pub const ERROR_KINDS_TOOL: &str = "schema.error_kinds";

/// A tool as described to MCP clients.
///
/// The input schema is an [`ObjectSchema`]: tool arguments are always a
/// JSON object, so any other top-level schema cannot be expressed.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema", serialize_with = "serialize_object_schema")]
    pub input_schema: ObjectSchema,
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<SchemaNode>,
}

fn serialize_object_schema<S>(schema: &ObjectSchema, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    SchemaNode::Object(schema.clone()).serialize(serializer)
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ObjectSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            output_schema: None,
        }
    }

    pub fn with_output_schema(mut self, schema: impl Into<SchemaNode>) -> Self {
        self.output_schema = Some(schema.into());
        self
    }

    /// Check call arguments against the input schema. Absent arguments are
    /// treated as an empty object.
    pub fn check_arguments(
        &self,
        arguments: Option<&serde_json::Value>,
    ) -> Result<ValidationErrors, SchemaError> {
        let empty = serde_json::Value::Object(serde_json::Map::new());
        let schema = SchemaNode::Object(self.input_schema.clone());
        validate(&schema, arguments.unwrap_or(&empty))
    }
}

/// The fixed set of tools this server exposes.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    pub fn builtin() -> Self {
        let validate_tool = ToolDefinition::new(
            VALIDATE_TOOL,
            "Validate a JSON value against a JSON Schema and report every violation",
            ObjectSchema::new()
                .required(["schema", "data"])
                .property(
                    "schema",
                    ObjectSchema::new().description(
                        "Schema using type, properties, items, combinators and per-type constraints",
                    ),
                )
                .property(
                    "data",
                    CombinedSchema::new().description("Any JSON value to validate"),
                )
                .additional_properties(false),
        )
        .with_output_schema(validation_report_schema());

        let kinds_tool = ToolDefinition::new(
            ERROR_KINDS_TOOL,
            "List every validation error kind the validator can report",
            ObjectSchema::new()
                .property(
                    "prefix",
                    StringSchema::new()
                        .pattern("^[a-z][A-Za-z]*$")
                        .max_length(64)
                        .description("Only list kinds starting with this prefix"),
                )
                .additional_properties(false),
        )
        .with_output_schema(
            ObjectSchema::new()
                .required(["kinds"])
                .property(
                    "kinds",
                    ArraySchema::new()
                        .items(StringSchema::new())
                        .unique_items(true),
                ),
        );

        Self {
            tools: vec![validate_tool, kinds_tool],
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Schema of the `schema.validate` result payload.
pub fn validation_report_schema() -> SchemaNode {
    ObjectSchema::new()
        .required(["valid", "errors"])
        .property("valid", BooleanSchema::new())
        .property(
            "errors",
            ArraySchema::new().items(
                ObjectSchema::new()
                    .required(["kind", "path"])
                    .property("kind", StringSchema::new().min_length(1))
                    .property("path", ArraySchema::new().items(StringSchema::new()))
                    .property("details", StringSchema::new())
                    .additional_properties(false),
            ),
        )
        .additional_properties(false)
        .into()
}
