//! # Warden Validate - Call-Time Schema Enforcement
//!
//! Checks what a model sends to a tool, and what the tool sends back,
//! against the JSON Schemas the tool declares.
//!
//! ## Purpose
//!
//! 1. **Input validation** - arguments must conform to the input schema; a
//!    tool without one cannot be called.
//!
//! 2. **Output validation** - results must conform to the output schema when
//!    one is declared.
//!
//! 3. **Tool-call validation** - the same checks driven by a caller-supplied
//!    [`ToolDescription`] list instead of the registry.
//!
//! 4. **Submission records** - [`validate_submitted_tool`] produces the
//!    `{name, checksum?, valid, error?}` record for a proposed definition.
//!
//! Every check reports one of three states. `Failed` means the data is
//! wrong; `Error` means the check itself could not run.
//!
//! ## Threat Model
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Argument Injection | Model passes fields the tool never declared | Input schema |
//! | Unschematized Tool | Tool accepts anything | Missing input schema fails |
//! | Result Poisoning | Tool returns unexpected structure | Output schema |
//!
//! ## Usage
//!
//! ```rust
//! use warden_validate::{validate_tool_call, ExecutionStatus, ToolCall, ToolDescription};
//! use serde_json::json;
//!
//! let tools = vec![ToolDescription::new("get_weather").with_input_schema(json!({
//!     "type": "object",
//!     "properties": {"location": {"type": "string"}},
//!     "required": ["location"]
//! }))];
//!
//! let call = ToolCall::new("get_weather", json!({"location": "Lisbon"}));
//! assert_eq!(validate_tool_call(&call, &tools).status(), ExecutionStatus::Succeeded);
//!
//! let call = ToolCall::new("delete_everything", json!({}));
//! assert_eq!(validate_tool_call(&call, &tools).status(), ExecutionStatus::Error);
//! ```

pub mod call;
pub mod error;
pub mod integrity;
pub mod schema;

pub use call::{
    find_tool_description, validate_call_arguments, validate_tool_call,
    validate_tool_call_output, ToolCall, ToolDescription,
};
pub use error::{Result, ValidateError};
pub use integrity::{validate_submitted_tool, ToolValidationResult};
pub use schema::{
    validate_input, validate_input_value, validate_output, ExecutionStatus, ToolContract,
    Validation, ValidationReport,
};
