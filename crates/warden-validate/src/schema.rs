//! # Schema Validator
//!
//! Checks a live tool call's arguments, and the tool's result, against the
//! JSON Schemas the tool declares.
//!
//! ## Tri-State Outcome
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | `Succeeded` | Document conforms (or no output contract exists) |
//! | `Failed` | Document is well-formed but violates the schema, or the tool has no input schema |
//! | `Error` | The check could not run: schema does not compile, document is not JSON |
//!
//! `Failed` and `Error` are kept apart so callers can tell "your data is
//! invalid" from "we could not check your data".
//!
//! ## Asymmetry
//!
//! A tool with no input schema fails input validation: an unschematized
//! tool cannot be called safely. A tool with no output schema passes output
//! validation unconditionally: there is no contract to check.

use crate::error::ValidateError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};
use warden_registry::Tool;

/// Wire form of the tri-state outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
    Error,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExecutionStatus::Succeeded => "succeeded",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Error => "error",
        })
    }
}

/// Outcome of a validation, carrying the error for the two failure states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Succeeded,
    Failed(ValidateError),
    Error(ValidateError),
}

impl Validation {
    pub fn status(&self) -> ExecutionStatus {
        match self {
            Validation::Succeeded => ExecutionStatus::Succeeded,
            Validation::Failed(_) => ExecutionStatus::Failed,
            Validation::Error(_) => ExecutionStatus::Error,
        }
    }

    pub fn error(&self) -> Option<&ValidateError> {
        match self {
            Validation::Succeeded => None,
            Validation::Failed(e) | Validation::Error(e) => Some(e),
        }
    }

    #[inline]
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Validation::Succeeded)
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, Validation::Failed(_))
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Validation::Error(_))
    }

    /// Collapses to a `Result`, dropping the Failed/Error distinction.
    pub fn into_result(self) -> crate::error::Result<()> {
        match self {
            Validation::Succeeded => Ok(()),
            Validation::Failed(e) | Validation::Error(e) => Err(e),
        }
    }

    /// Serializable `{status, error?}` response.
    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            status: self.status(),
            error: self.error().map(ToString::to_string),
        }
    }
}

/// `{status: succeeded|failed|error, error?}` as returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Anything that names a tool and declares its schemas.
pub trait ToolContract {
    fn name(&self) -> &str;
    fn input_schema(&self) -> Option<&Value>;
    fn output_schema(&self) -> Option<&Value>;
}

impl ToolContract for Tool {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_schema(&self) -> Option<&Value> {
        self.input_schema.as_ref().filter(|s| !s.is_null())
    }

    fn output_schema(&self) -> Option<&Value> {
        self.output_schema.as_ref().filter(|s| !s.is_null())
    }
}

/// Validates raw argument bytes against the tool's input schema.
///
/// ```rust
/// use warden_registry::Tool;
/// use warden_validate::{validate_input, ExecutionStatus};
/// use serde_json::json;
///
/// let tool = Tool::builder("get_weather")
///     .input_schema(json!({
///         "type": "object",
///         "properties": {"location": {"type": "string"}},
///         "required": ["location"]
///     }))
///     .build();
///
/// assert!(validate_input(&tool, br#"{"location": "Oslo"}"#).is_succeeded());
///
/// let missing = validate_input(&tool, br#"{}"#);
/// assert_eq!(missing.status(), ExecutionStatus::Failed);
/// assert!(missing.error().unwrap().to_string().contains("location"));
///
/// assert!(validate_input(&tool, b"{oops").is_error());
/// ```
pub fn validate_input<T: ToolContract + ?Sized>(tool: &T, arguments: &[u8]) -> Validation {
    if tool.input_schema().is_none() {
        return missing_input_schema(tool);
    }

    let document: Value = match serde_json::from_slice(arguments) {
        Ok(value) => value,
        Err(e) => {
            error!(tool = tool.name(), error = %e, "Tool arguments are not valid JSON");
            return Validation::Error(ValidateError::InputDocument {
                tool: tool.name().to_string(),
                detail: e.to_string(),
            });
        }
    };

    validate_input_value(tool, &document)
}

/// Validates already-decoded arguments against the tool's input schema.
pub fn validate_input_value<T: ToolContract + ?Sized>(tool: &T, arguments: &Value) -> Validation {
    let Some(schema) = tool.input_schema() else {
        return missing_input_schema(tool);
    };

    let validator = match jsonschema::options().build(schema) {
        Ok(v) => v,
        Err(e) => {
            error!(tool = tool.name(), error = %e, "Invalid InputSchema");
            return Validation::Error(ValidateError::InputSchema {
                tool: tool.name().to_string(),
                detail: e.to_string(),
            });
        }
    };

    let violations = collect_violations(&validator, arguments);
    if violations.is_empty() {
        debug!(tool = tool.name(), "Input arguments validated");
        return Validation::Succeeded;
    }

    let err = ValidateError::InputRejected {
        tool: tool.name().to_string(),
        violations,
    };
    warn!("SECURITY ALERT: {}", err);
    Validation::Failed(err)
}

/// Validates a raw tool result against the tool's output schema.
/// Succeeds unconditionally when no output schema is declared.
pub fn validate_output<T: ToolContract + ?Sized>(tool: &T, raw_result: &str) -> Validation {
    let Some(schema) = tool.output_schema() else {
        debug!(tool = tool.name(), "No OutputSchema declared, output accepted");
        return Validation::Succeeded;
    };

    let validator = match jsonschema::options().build(schema) {
        Ok(v) => v,
        Err(e) => {
            error!(tool = tool.name(), error = %e, "Invalid OutputSchema");
            return Validation::Error(ValidateError::OutputSchema {
                tool: tool.name().to_string(),
                detail: e.to_string(),
            });
        }
    };

    let document: Value = match serde_json::from_str(raw_result) {
        Ok(value) => value,
        Err(e) => {
            error!(tool = tool.name(), error = %e, "Tool output is not valid JSON");
            return Validation::Error(ValidateError::OutputDocument {
                tool: tool.name().to_string(),
                detail: e.to_string(),
            });
        }
    };

    let violations = collect_violations(&validator, &document);
    if violations.is_empty() {
        debug!(tool = tool.name(), "Output content validated");
        return Validation::Succeeded;
    }

    let err = ValidateError::OutputRejected {
        tool: tool.name().to_string(),
        violations,
        raw: raw_result.to_string(),
    };
    warn!("SECURITY ALERT: {}", err);
    Validation::Failed(err)
}

fn missing_input_schema<T: ToolContract + ?Sized>(tool: &T) -> Validation {
    warn!(tool = tool.name(), "Call rejected: tool declares no InputSchema");
    Validation::Failed(ValidateError::MissingInputSchema(tool.name().to_string()))
}

fn collect_violations(validator: &jsonschema::Validator, document: &Value) -> Vec<String> {
    validator
        .iter_errors(document)
        .map(|e| {
            format!(
                "- {}: {}",
                field_path(&e.instance_path.to_string()),
                e
            )
        })
        .collect()
}

/// JSON pointer to dotted field path; the document root is `(root)`.
fn field_path(pointer: &str) -> String {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        "(root)".to_string()
    } else {
        trimmed.replace('/', ".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather() -> Tool {
        Tool::builder("get_weather")
            .input_schema(json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string"},
                    "unit": {"type": "string", "enum": ["celsius", "fahrenheit"]}
                },
                "required": ["location"]
            }))
            .output_schema(json!({
                "type": "object",
                "properties": {
                    "temperature": {"type": "number"},
                    "conditions": {"type": "string"}
                },
                "required": ["temperature", "conditions"]
            }))
            .build()
    }

    #[test]
    fn test_valid_arguments() {
        let v = validate_input(&weather(), br#"{"location": "London", "unit": "celsius"}"#);
        assert_eq!(v, Validation::Succeeded);
        assert!(v.error().is_none());
    }

    #[test]
    fn test_optional_field_missing() {
        assert!(validate_input(&weather(), br#"{"location": "Paris"}"#).is_succeeded());
    }

    #[test]
    fn test_missing_required_field() {
        let v = validate_input(&weather(), br#"{"unit": "fahrenheit"}"#);
        assert!(v.is_failed());
        let msg = v.error().unwrap().to_string();
        assert!(msg.starts_with("Input validation failed for tool 'get_weather':\n- "));
        assert!(msg.contains("location"));
        assert!(msg.contains("required"));
    }

    #[test]
    fn test_type_mismatch_names_field() {
        let v = validate_input(&weather(), br#"{"location": 123}"#);
        assert!(v.is_failed());
        let msg = v.error().unwrap().to_string();
        assert!(msg.contains("- location: "));
        assert!(msg.contains("string"));
    }

    #[test]
    fn test_enum_mismatch_names_field() {
        let v = validate_input(&weather(), br#"{"location": "Tokyo", "unit": "kelvin"}"#);
        let msg = v.error().unwrap().to_string();
        assert!(v.is_failed());
        assert!(msg.contains("- unit: "));
        assert!(msg.contains("kelvin"));
    }

    #[test]
    fn test_every_violation_listed() {
        let v = validate_input(&weather(), br#"{"unit": "kelvin"}"#);
        let err = v.error().unwrap();
        assert_eq!(err.violations().len(), 2);
        assert!(err.violations().iter().all(|line| line.starts_with("- ")));
    }

    #[test]
    fn test_arguments_not_json_is_error() {
        let v = validate_input(&weather(), br#"{location: "Berlin"}"#);
        assert!(v.is_error());
        assert!(v
            .error()
            .unwrap()
            .to_string()
            .contains("internal validation error"));
    }

    #[test]
    fn test_bad_input_schema_is_error() {
        let tool = Tool::builder("bad")
            .input_schema(json!({"type": 12}))
            .build();
        let v = validate_input(&tool, br#"{"location": "Rome"}"#);
        assert!(v.is_error());
        assert_eq!(
            v.error().unwrap().to_string(),
            "internal schema error for tool 'bad'"
        );
    }

    #[test]
    fn test_no_input_schema_fails_even_on_empty_input() {
        let tool = Tool::builder("bare").without_input_schema().build();
        for args in [&b""[..], &b"{}"[..], &b"{\"any\": 1}"[..], &b"not json"[..]] {
            let v = validate_input(&tool, args);
            assert!(v.is_failed());
            assert_eq!(
                v.error().unwrap().to_string(),
                "no InputSchema defined for tool 'bare'"
            );
        }
    }

    #[test]
    fn test_null_schemas_count_as_absent() {
        let tool = Tool::builder("nulls")
            .input_schema(Value::Null)
            .output_schema(Value::Null)
            .build();

        let v = validate_input(&tool, br#"{"location": "Quito"}"#);
        assert!(v.is_failed());
        assert_eq!(
            v.error().unwrap().to_string(),
            "no InputSchema defined for tool 'nulls'"
        );
        assert!(validate_output(&tool, "not json").is_succeeded());
    }

    #[test]
    fn test_output_valid_and_invalid() {
        let tool = weather();
        assert!(validate_output(&tool, r#"{"temperature": 21.5, "conditions": "sunny"}"#)
            .is_succeeded());

        let raw = r#"{"temperature": "hot"}"#;
        let v = validate_output(&tool, raw);
        assert!(v.is_failed());
        let msg = v.error().unwrap().to_string();
        assert!(msg.starts_with("Tool 'get_weather' output failed validation:\n"));
        assert!(msg.ends_with(&format!("Raw Output: {raw}")));
    }

    #[test]
    fn test_no_output_schema_always_succeeds() {
        let tool = Tool::builder("free").build();
        assert!(validate_output(&tool, "anything at all, not even JSON").is_succeeded());
    }

    #[test]
    fn test_output_not_json_is_error() {
        let v = validate_output(&weather(), "<html>");
        assert!(v.is_error());
        assert_eq!(
            v.error().unwrap().to_string(),
            "internal output validation error for tool 'get_weather'"
        );
    }

    #[test]
    fn test_bad_output_schema_is_error() {
        let tool = Tool::builder("bad_out")
            .output_schema(json!({"type": "not-a-type"}))
            .build();
        let v = validate_output(&tool, "{}");
        assert!(v.is_error());
        assert!(v
            .error()
            .unwrap()
            .to_string()
            .contains("internal output schema error"));
    }

    #[test]
    fn test_report_serialization() {
        let ok = serde_json::to_value(Validation::Succeeded.report()).unwrap();
        assert_eq!(ok, json!({"status": "succeeded"}));

        let failed = validate_input(&weather(), b"{}").report();
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["status"], "failed");
        assert!(value["error"].as_str().unwrap().contains("location"));
    }

    #[test]
    fn test_field_path() {
        assert_eq!(field_path(""), "(root)");
        assert_eq!(field_path("/location"), "location");
        assert_eq!(field_path("/a/0/b"), "a.0.b");
    }
}
