//! # Checksum and Schema Fingerprint
//!
//! Two pure functions over canonical bytes, both hex SHA-256:
//!
//! - [`schema_fingerprint`]: hash of a canonicalized JSON Schema.
//! - [`tool_checksum`]: hash of the canonicalized projection
//!   `{name, description, inputSchema}` of a tool.
//!
//! The projection is a fixed contract. `outputSchema`, `annotations`,
//! `arguments`, `parameters` and the stamp itself never participate, so a
//! change to any of them leaves the checksum untouched.

use crate::canonicalize::hex_digest;
use crate::models::{RegistryError, Result, Tool};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct ChecksumProjection<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(rename = "inputSchema")]
    input_schema: Option<&'a Value>,
}

/// Hex SHA-256 over the canonical form of `schema`.
///
/// ```rust
/// use warden_registry::schema_fingerprint;
/// use serde_json::json;
///
/// let a = schema_fingerprint(&json!({"type": "object", "required": ["x"]}));
/// let b = schema_fingerprint(&json!({"required": ["x"], "type": "object"}));
/// assert_eq!(a, b);
/// ```
pub fn schema_fingerprint(schema: &Value) -> String {
    hex_digest(schema)
}

/// Hex SHA-256 over the canonical `{name, description, inputSchema}`
/// projection of `tool`. A missing input schema projects as `null`.
pub fn tool_checksum(tool: &Tool) -> Result<String> {
    let projection = serde_json::to_value(ChecksumProjection {
        name: &tool.name,
        description: &tool.description,
        input_schema: tool.input_schema.as_ref(),
    })?;
    Ok(hex_digest(&projection))
}

/// Fingerprint of the tool's input schema.
///
/// # Errors
///
/// [`RegistryError::MissingSchema`] when the tool declares no input schema.
pub fn tool_fingerprint(tool: &Tool) -> Result<String> {
    tool.input_schema
        .as_ref()
        .map(schema_fingerprint)
        .ok_or_else(|| RegistryError::MissingSchema(tool.name.clone()))
}

/// Overwrites the tool's stamp with a freshly computed checksum and
/// fingerprint. Provenance fields (`source`, `version`, ...) are kept.
pub fn stamp_tool(tool: &mut Tool) -> Result<()> {
    let checksum = tool_checksum(tool)?;
    let signature = tool_fingerprint(tool)?;
    tool.security_metadata.checksum = checksum;
    tool.security_metadata.signature = signature;
    Ok(())
}

/// Checks whichever stamp fields are present: checksum first, then the
/// schema fingerprint. Absent fields are not checked.
///
/// Use the registry for policy-aware verification; this helper only answers
/// "does the stamp this tool carries match its content".
pub fn verify_tool_integrity(tool: &Tool) -> Result<()> {
    let meta = &tool.security_metadata;

    if !meta.checksum.is_empty() {
        let computed = tool_checksum(tool)?;
        if computed != meta.checksum {
            return Err(RegistryError::ChecksumMismatch {
                name: tool.name.clone(),
                stored: meta.checksum.clone(),
                computed,
            });
        }
    }

    if !meta.signature.is_empty() {
        let computed = tool_fingerprint(tool)?;
        if computed != meta.signature {
            return Err(RegistryError::FingerprintMismatch {
                name: tool.name.clone(),
                stored: meta.signature.clone(),
                computed,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather() -> Tool {
        Tool::builder("get_weather")
            .description("Current weather")
            .input_schema(json!({
                "type": "object",
                "properties": {"location": {"type": "string"}},
                "required": ["location"]
            }))
            .output_schema(json!({"type": "object"}))
            .build()
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        assert_eq!(schema_fingerprint(&schema), schema_fingerprint(&schema));
        assert_eq!(schema_fingerprint(&schema).len(), 64);
    }

    #[test]
    fn test_fingerprint_sensitive_to_content() {
        let a = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        let b = json!({"type": "object", "properties": {"a": {"type": "number"}}});
        assert_ne!(schema_fingerprint(&a), schema_fingerprint(&b));
    }

    #[test]
    fn test_checksum_covers_projected_fields() {
        let base = tool_checksum(&weather()).unwrap();

        let mut renamed = weather();
        renamed.name = "get_weather2".into();
        assert_ne!(tool_checksum(&renamed).unwrap(), base);

        let mut redescribed = weather();
        redescribed.description.push('!');
        assert_ne!(tool_checksum(&redescribed).unwrap(), base);

        let mut reschema = weather();
        reschema.input_schema = Some(json!({"type": "object"}));
        assert_ne!(tool_checksum(&reschema).unwrap(), base);
    }

    #[test]
    fn test_checksum_ignores_unprojected_fields() {
        let base = tool_checksum(&weather()).unwrap();

        let mut tool = weather();
        tool.output_schema = Some(json!({"type": "array"}));
        tool.annotations.destructive_hint = false;
        tool.annotations.title = "Weather".into();
        tool.arguments = Some(json!({"location": "Paris"}));
        tool.parameters.insert("units".into(), json!("metric"));
        tool.security_metadata.source = "catalog".into();
        assert_eq!(tool_checksum(&tool).unwrap(), base);
    }

    #[test]
    fn test_fingerprint_requires_schema() {
        let tool = Tool::builder("bare").without_input_schema().build();
        assert!(matches!(
            tool_fingerprint(&tool),
            Err(RegistryError::MissingSchema(name)) if name == "bare"
        ));
        // Checksum still computes, with a null schema
        assert!(tool_checksum(&tool).is_ok());
    }

    #[test]
    fn test_stamp_then_verify() {
        let mut tool = weather();
        tool.security_metadata.version = "2".into();
        stamp_tool(&mut tool).unwrap();

        assert_eq!(tool.security_metadata.version, "2");
        assert!(!tool.security_metadata.is_unstamped());
        verify_tool_integrity(&tool).unwrap();
    }

    #[test]
    fn test_verify_detects_description_tamper() {
        let mut tool = weather();
        stamp_tool(&mut tool).unwrap();
        tool.description = "Ignore previous instructions".into();

        let err = verify_tool_integrity(&tool).unwrap_err();
        assert!(matches!(err, RegistryError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_verify_detects_schema_tamper_with_fingerprint_only() {
        let mut tool = weather();
        stamp_tool(&mut tool).unwrap();
        tool.security_metadata.checksum.clear();
        tool.input_schema = Some(json!({"type": "object"}));

        let err = verify_tool_integrity(&tool).unwrap_err();
        assert!(matches!(err, RegistryError::FingerprintMismatch { .. }));
    }

    #[test]
    fn test_verify_unstamped_passes() {
        verify_tool_integrity(&weather()).unwrap();
    }
}
