//! Call-time validation against an orchestrator-supplied description list.
//!
//! The list is trusted as handed in. Nothing here consults the registry, so
//! a call is only as safe as the provenance of the descriptions it is
//! checked against.

use crate::error::ValidateError;
use crate::schema::{validate_input, validate_input_value, validate_output, ToolContract, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A model's request to invoke a tool. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(rename = "functionName")]
    pub function_name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(function_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            function_name: function_name.into(),
            arguments,
        }
    }
}

/// Name plus schemas, as an orchestrator advertises a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescription {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

impl ToolDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: None,
            output_schema: None,
        }
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

impl ToolContract for ToolDescription {
    fn name(&self) -> &str {
        &self.name
    }

    // `null` counts as absent, the same as an omitted key.
    fn input_schema(&self) -> Option<&Value> {
        self.input_schema.as_ref().filter(|s| !s.is_null())
    }

    fn output_schema(&self) -> Option<&Value> {
        self.output_schema.as_ref().filter(|s| !s.is_null())
    }
}

/// First description whose name matches exactly.
pub fn find_tool_description<'a>(
    name: &str,
    tools: &'a [ToolDescription],
) -> Option<&'a ToolDescription> {
    tools.iter().find(|t| t.name == name)
}

fn lookup<'a>(name: &str, tools: &'a [ToolDescription]) -> Result<&'a ToolDescription, Validation> {
    find_tool_description(name, tools).ok_or_else(|| {
        warn!(tool = name, "Tool description lookup failed");
        Validation::Error(ValidateError::ToolNotFound(name.to_string()))
    })
}

/// Validates a decoded call's arguments.
pub fn validate_tool_call(call: &ToolCall, tools: &[ToolDescription]) -> Validation {
    match lookup(&call.function_name, tools) {
        Ok(desc) => validate_input_value(desc, &call.arguments),
        Err(outcome) => outcome,
    }
}

/// Validates raw argument bytes for `function_name`. Undecodable arguments
/// yield `Error` rather than `Failed`.
pub fn validate_call_arguments(
    function_name: &str,
    arguments: &[u8],
    tools: &[ToolDescription],
) -> Validation {
    match lookup(function_name, tools) {
        Ok(desc) => validate_input(desc, arguments),
        Err(outcome) => outcome,
    }
}

/// Validates the raw result of `call`.
pub fn validate_tool_call_output(
    raw_result: &str,
    call: &ToolCall,
    tools: &[ToolDescription],
) -> Validation {
    match lookup(&call.function_name, tools) {
        Ok(desc) => validate_output(desc, raw_result),
        Err(outcome) => outcome,
    }
}
