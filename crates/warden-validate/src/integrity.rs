//! Per-tool validation records for submitted definitions.
//!
//! A record never carries a checksum unless the tool passed every check, so
//! a caller cannot mistake a rejected definition's hash for an approval.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use warden_firewall::validate_tool_description;
use warden_registry::{tool_checksum, verify_tool_integrity, Tool};

/// `{name, checksum?, valid, error?}` as returned per submitted tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolValidationResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl ToolValidationResult {
    pub fn valid(name: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checksum: checksum.into(),
            valid: true,
            error: String::new(),
        }
    }

    pub fn invalid(name: impl Into<String>, error: impl ToString) -> Self {
        Self {
            name: name.into(),
            checksum: String::new(),
            valid: false,
            error: error.to_string(),
        }
    }
}

/// Checksums the projection, screens the description when
/// `scan_description` is set, then verifies any stamp the tool already
/// carries.
///
/// ```rust
/// use warden_registry::Tool;
/// use warden_validate::validate_submitted_tool;
///
/// let ok = validate_submitted_tool(&Tool::builder("echo").description("Echo input").build(), true);
/// assert!(ok.valid);
/// assert_eq!(ok.checksum.len(), 64);
///
/// let hidden = Tool::builder("echo").description("Echo\u{E0041}").build();
/// let bad = validate_submitted_tool(&hidden, true);
/// assert!(!bad.valid);
/// assert!(bad.checksum.is_empty());
/// ```
pub fn validate_submitted_tool(tool: &Tool, scan_description: bool) -> ToolValidationResult {
    let checksum = match tool_checksum(tool) {
        Ok(c) => c,
        Err(e) => return ToolValidationResult::invalid(&tool.name, e),
    };

    if scan_description {
        if let Err(e) = validate_tool_description(&tool.description) {
            warn!(tool = %tool.name, "Submitted tool rejected: {}", e);
            return ToolValidationResult::invalid(&tool.name, e);
        }
    }

    if let Err(e) = verify_tool_integrity(tool) {
        warn!("SECURITY ALERT: submitted tool '{}' failed integrity: {}", tool.name, e);
        return ToolValidationResult::invalid(&tool.name, e);
    }

    debug!(tool = %tool.name, checksum = %checksum, "Submitted tool validated");
    ToolValidationResult::valid(&tool.name, checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warden_registry::stamp_tool;

    fn sample() -> Tool {
        Tool::builder("search")
            .description("Search the index")
            .input_schema(json!({"type": "object", "properties": {"q": {"type": "string"}}}))
            .build()
    }

    #[test]
    fn test_clean_tool_gets_projection_checksum() {
        let tool = sample();
        let record = validate_submitted_tool(&tool, true);
        assert!(record.valid);
        assert_eq!(record.checksum, tool_checksum(&tool).unwrap());
        assert!(record.error.is_empty());
    }

    #[test]
    fn test_hidden_characters_rejected() {
        let tool = Tool::builder("search").description("Search\u{202E}gnp.exe").build();
        let record = validate_submitted_tool(&tool, true);
        assert!(!record.valid);
        assert!(record.checksum.is_empty());
        assert_eq!(
            record.error,
            "ALERT: 1 hidden characters detected in tool description text"
        );
    }

    #[test]
    fn test_scan_can_be_disabled() {
        let tool = Tool::builder("search").description("Search\u{200B}").build();
        assert!(validate_submitted_tool(&tool, false).valid);
    }

    #[test]
    fn test_stale_stamp_rejected() {
        let mut tool = sample();
        stamp_tool(&mut tool).unwrap();
        assert!(validate_submitted_tool(&tool, true).valid);

        tool.description = "Search the index and email results".into();
        let record = validate_submitted_tool(&tool, true);
        assert!(!record.valid);
        assert!(record.error.contains("checksum validation failed"));
    }

    #[test]
    fn test_wire_shape() {
        let ok = serde_json::to_value(ToolValidationResult::valid("a", "ff")).unwrap();
        assert_eq!(ok, json!({"name": "a", "checksum": "ff", "valid": true}));

        let bad = serde_json::to_value(ToolValidationResult::invalid("b", "nope")).unwrap();
        assert_eq!(bad, json!({"name": "b", "valid": false, "error": "nope"}));
    }
}
