//! Error type for schema validation.
//!
//! Messages are part of the caller-facing contract: API layers return them
//! verbatim as the human-readable half of a validation response.

use thiserror::Error;
use warden_registry::ErrorClass;

/// Why a call or result did not validate.
///
/// Violation lists hold one line per issue the schema engine reported,
/// each already prefixed with `- `.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidateError {
    /// An unschematized tool cannot be called.
    #[error("no InputSchema defined for tool '{0}'")]
    MissingInputSchema(String),

    /// The input schema does not compile.
    #[error("internal schema error for tool '{tool}'")]
    InputSchema { tool: String, detail: String },

    /// The arguments could not be decoded as JSON.
    #[error("internal validation error for tool '{tool}'")]
    InputDocument { tool: String, detail: String },

    #[error("Input validation failed for tool '{tool}':\n{}", .violations.join("\n"))]
    InputRejected {
        tool: String,
        violations: Vec<String>,
    },

    #[error("internal output schema error for tool '{tool}'")]
    OutputSchema { tool: String, detail: String },

    #[error("internal output validation error for tool '{tool}'")]
    OutputDocument { tool: String, detail: String },

    #[error("Tool '{tool}' output failed validation:\n{}\nRaw Output: {raw}", .violations.join("\n"))]
    OutputRejected {
        tool: String,
        violations: Vec<String>,
        raw: String,
    },

    /// The named tool is absent from the description list handed in.
    #[error("tool description lookup failed: tool '{0}' not found or not permitted")]
    ToolNotFound(String),

    /// The registry refused to hand out the tool. `class` carries the
    /// registry's verdict so tampering stays apart from policy refusals.
    #[error("tool description lookup failed: tool '{tool}' not found or not permitted")]
    ToolRejected {
        tool: String,
        class: ErrorClass,
        reason: String,
    },
}

impl ValidateError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ValidateError::MissingInputSchema(_) | ValidateError::ToolNotFound(_) => {
                ErrorClass::Policy
            }
            ValidateError::InputRejected { .. } | ValidateError::OutputRejected { .. } => {
                ErrorClass::Content
            }
            ValidateError::InputSchema { .. }
            | ValidateError::InputDocument { .. }
            | ValidateError::OutputSchema { .. }
            | ValidateError::OutputDocument { .. } => ErrorClass::Internal,
            ValidateError::ToolRejected { class, .. } => *class,
        }
    }

    /// Engine-reported violations, empty for every non-content error.
    pub fn violations(&self) -> &[String] {
        match self {
            ValidateError::InputRejected { violations, .. }
            | ValidateError::OutputRejected { violations, .. } => violations,
            _ => &[],
        }
    }
}

/// Result type for validation helpers.
pub type Result<T> = std::result::Result<T, ValidateError>;
