//! # Core Data Models for the Tool Registry
//!
//! The unit of trust is the [`Tool`]: a name, a free-text description, a
//! JSON Schema for its inputs (and optionally its outputs), advisory
//! behavioral hints, and a [`SecurityMetadata`] stamp.
//!
//! ## Threat Model
//!
//! - **Silent Mutation**: a stored tool whose description or input schema is
//!   altered after stamping must become unreadable. The stamp fields here
//!   are what the registry recomputes and compares on every read.
//! - **Unsigned Injection**: a tool presented with no stamp at all is
//!   detectable through [`SecurityMetadata::is_empty`].
//! - **Permissive Defaults**: omitted behavioral hints fall back to the
//!   conservative posture (destructive, open-world), never the permissive one.
//!
//! ## Wire Format
//!
//! Field names follow the MCP tool document: `inputSchema`, `outputSchema`,
//! `annotations`, and the stamp under `secMetaData`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// SHA-256 output size in bytes (NIST FIPS 180-4).
pub const HASH_SIZE: usize = 32;

/// A raw SHA-256 digest.
pub type Hash = [u8; HASH_SIZE];

/// Algorithm name reported for both stamp schemes.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Behavioral hints attached to a tool.
///
/// Advisory only: nothing in the registry enforces them, and they do not
/// participate in the tool checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolAnnotations {
    /// Human-readable title.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// The tool does not modify its environment.
    pub read_only_hint: bool,

    /// The tool may perform destructive updates.
    pub destructive_hint: bool,

    /// Repeated calls with the same arguments have no additional effect.
    pub idempotent_hint: bool,

    /// The tool interacts with entities outside the local environment.
    pub open_world_hint: bool,
}

impl Default for ToolAnnotations {
    fn default() -> Self {
        Self {
            title: String::new(),
            read_only_hint: false,
            destructive_hint: true,
            idempotent_hint: false,
            open_world_hint: true,
        }
    }
}

/// Trust stamp carried by a tool.
///
/// `checksum` and `signature` are written by the registry; the remaining
/// fields describe provenance and are supplied by whoever publishes the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityMetadata {
    /// Origin of the definition (e.g. "trusted-registry").
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,

    /// Hex SHA-256 schema fingerprint.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub signature: String,

    /// Identifier of the key the publisher signed with.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub public_key_id: String,

    /// Publisher-assigned version of the definition.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Hex SHA-256 tool checksum.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub checksum: String,
}

impl SecurityMetadata {
    /// True iff every field is empty.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
            && self.signature.is_empty()
            && self.public_key_id.is_empty()
            && self.version.is_empty()
            && self.checksum.is_empty()
    }

    /// True iff either half of the integrity stamp is missing.
    pub fn is_unstamped(&self) -> bool {
        self.checksum.is_empty() || self.signature.is_empty()
    }
}

/// An MCP tool definition.
///
/// # Example
///
/// ```rust
/// use warden_registry::Tool;
/// use serde_json::json;
///
/// let tool = Tool::builder("get_weather")
///     .description("Current weather for a city")
///     .input_schema(json!({
///         "type": "object",
///         "properties": { "location": { "type": "string" } },
///         "required": ["location"]
///     }))
///     .read_only_hint(true)
///     .build();
///
/// assert!(tool.annotations.destructive_hint);
/// assert!(tool.security_metadata.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique registry key.
    #[serde(default)]
    pub name: String,

    /// Free text shown to the model. Scanned for hidden characters.
    #[serde(default)]
    pub description: String,

    /// Example or default arguments, carried opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,

    /// Free-form parameters, carried opaquely.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,

    /// JSON Schema the call arguments must satisfy.
    #[serde(default, rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,

    /// JSON Schema the call result must satisfy, if any.
    #[serde(default, rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,

    #[serde(default)]
    pub annotations: ToolAnnotations,

    #[serde(default, rename = "secMetaData")]
    pub security_metadata: SecurityMetadata,
}

impl Tool {
    /// Starts a [`ToolBuilder`] for a tool called `name`.
    pub fn builder(name: impl Into<String>) -> ToolBuilder {
        ToolBuilder::new(name)
    }
}

/// Explicit construction of a [`Tool`] with every optional field defaulted.
///
/// Defaults: input schema `{"type":"object","properties":{}}`, no output
/// schema, no arguments or parameters, [`ToolAnnotations::default`] and an
/// empty stamp.
#[derive(Debug, Clone)]
pub struct ToolBuilder {
    tool: Tool,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            tool: Tool {
                name: name.into(),
                description: String::new(),
                arguments: None,
                parameters: Map::new(),
                input_schema: Some(json!({"type": "object", "properties": {}})),
                output_schema: None,
                annotations: ToolAnnotations::default(),
                security_metadata: SecurityMetadata::default(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.tool.description = description.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.tool.input_schema = Some(schema);
        self
    }

    /// Removes the input schema entirely. Such a tool cannot be called.
    pub fn without_input_schema(mut self) -> Self {
        self.tool.input_schema = None;
        self
    }

    pub fn output_schema(mut self, schema: Value) -> Self {
        self.tool.output_schema = Some(schema);
        self
    }

    pub fn arguments(mut self, arguments: Value) -> Self {
        self.tool.arguments = Some(arguments);
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.tool.parameters.insert(key.into(), value);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.tool.annotations.title = title.into();
        self
    }

    pub fn read_only_hint(mut self, hint: bool) -> Self {
        self.tool.annotations.read_only_hint = hint;
        self
    }

    pub fn destructive_hint(mut self, hint: bool) -> Self {
        self.tool.annotations.destructive_hint = hint;
        self
    }

    pub fn idempotent_hint(mut self, hint: bool) -> Self {
        self.tool.annotations.idempotent_hint = hint;
        self
    }

    pub fn open_world_hint(mut self, hint: bool) -> Self {
        self.tool.annotations.open_world_hint = hint;
        self
    }

    pub fn security_metadata(mut self, metadata: SecurityMetadata) -> Self {
        self.tool.security_metadata = metadata;
        self
    }

    pub fn build(self) -> Tool {
        self.tool
    }
}

/// Enumeration view returned by [`ToolRegistry::list_tools`](crate::ToolRegistry::list_tools).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSet {
    /// All registered tools, ascending by name.
    pub tools: Vec<Tool>,
    pub security_enabled: bool,
    pub schema_fingerprint_algo: String,
    pub checksum_algo: String,
}

/// Coarse classification of every error the gateway reports.
///
/// Lets an API layer map any failure to a machine-checkable status without
/// matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Malformed input, wrong sizes, incomplete payloads.
    Structural,
    /// Evidence of tampering.
    Integrity,
    /// Rejected by configured policy.
    Policy,
    /// Well-formed data that violates its declared contract.
    Content,
    /// The checking machinery itself could not run.
    Internal,
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Stored checksum does not match the recomputed one.
    #[error("tool checksum validation failed for '{name}'")]
    ChecksumMismatch {
        name: String,
        stored: String,
        computed: String,
    },

    /// Stored schema fingerprint does not match the recomputed one.
    #[error("schema fingerprint validation failed for '{name}'")]
    FingerprintMismatch {
        name: String,
        stored: String,
        computed: String,
    },

    /// Unsigned tool under a reject-unsigned policy.
    #[error("unsigned tool rejected: '{0}'")]
    UnsignedTool(String),

    #[error("tool not found: '{0}'")]
    NotFound(String),

    /// A fingerprint was requested for a tool with no input schema.
    #[error("tool '{0}' has no input schema to fingerprint")]
    MissingSchema(String),

    /// The definition itself is unusable (bad name, key/name mismatch).
    #[error("invalid tool definition: {0}")]
    InvalidDefinition(String),

    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("received non-200 status: {0}")]
    CatalogStatus(u16),

    #[error("catalog response could not be decoded: {0}")]
    CatalogDecode(String),

    #[error("missing tool repo credentials")]
    MissingCredentials,
}

impl RegistryError {
    /// Stable protocol error code, where one exists.
    pub fn code(&self) -> Option<u16> {
        match self {
            RegistryError::ChecksumMismatch { .. } => Some(4001),
            RegistryError::FingerprintMismatch { .. } => Some(4002),
            RegistryError::UnsignedTool(_) => Some(4003),
            RegistryError::NotFound(_) => Some(4004),
            RegistryError::MissingSchema(_)
            | RegistryError::InvalidDefinition(_)
            | RegistryError::Canonicalization(_) => Some(4005),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            RegistryError::ChecksumMismatch { .. } | RegistryError::FingerprintMismatch { .. } => {
                ErrorClass::Integrity
            }
            RegistryError::UnsignedTool(_) | RegistryError::NotFound(_) => ErrorClass::Policy,
            RegistryError::MissingSchema(_) => ErrorClass::Policy,
            RegistryError::InvalidDefinition(_)
            | RegistryError::Canonicalization(_)
            | RegistryError::CatalogStatus(_)
            | RegistryError::CatalogDecode(_)
            | RegistryError::MissingCredentials => ErrorClass::Structural,
            RegistryError::Database(_) | RegistryError::Http(_) => ErrorClass::Internal,
        }
    }

    /// True for checksum and fingerprint mismatches.
    pub fn is_tampering(&self) -> bool {
        self.class() == ErrorClass::Integrity
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_defaults_are_conservative() {
        let a = ToolAnnotations::default();
        assert_eq!(a.title, "");
        assert!(!a.read_only_hint);
        assert!(a.destructive_hint);
        assert!(!a.idempotent_hint);
        assert!(a.open_world_hint);
    }

    #[test]
    fn test_builder_defaults() {
        let tool = Tool::builder("noop").build();
        assert_eq!(tool.name, "noop");
        assert_eq!(
            tool.input_schema,
            Some(json!({"type": "object", "properties": {}}))
        );
        assert!(tool.output_schema.is_none());
        assert_eq!(tool.annotations, ToolAnnotations::default());
        assert!(tool.security_metadata.is_empty());
    }

    #[test]
    fn test_deserialize_wire_names() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "t",
            "description": "d",
            "inputSchema": {"type": "object"},
            "outputSchema": {"type": "string"},
            "annotations": {"readOnlyHint": true},
            "secMetaData": {"checksum": "ab", "signature": "cd", "public_key_id": "k1"}
        }))
        .unwrap();

        assert_eq!(tool.input_schema, Some(json!({"type": "object"})));
        assert_eq!(tool.output_schema, Some(json!({"type": "string"})));
        assert!(tool.annotations.read_only_hint);
        // Omitted hints keep the conservative defaults
        assert!(tool.annotations.destructive_hint);
        assert!(tool.annotations.open_world_hint);
        assert_eq!(tool.security_metadata.public_key_id, "k1");
        assert!(!tool.security_metadata.is_unstamped());
    }

    #[test]
    fn test_missing_annotations_use_defaults() {
        let tool: Tool = serde_json::from_value(json!({"name": "bare"})).unwrap();
        assert_eq!(tool.annotations, ToolAnnotations::default());
        assert!(tool.input_schema.is_none());
        assert!(tool.security_metadata.is_empty());
    }

    #[test]
    fn test_security_metadata_emptiness() {
        let mut meta = SecurityMetadata::default();
        assert!(meta.is_empty());
        assert!(meta.is_unstamped());

        meta.version = "1.0".to_string();
        assert!(!meta.is_empty());
        assert!(meta.is_unstamped());

        meta.checksum = "aa".to_string();
        meta.signature = "bb".to_string();
        assert!(!meta.is_unstamped());
    }

    #[test]
    fn test_error_codes_and_classes() {
        let err = RegistryError::ChecksumMismatch {
            name: "t".into(),
            stored: "a".into(),
            computed: "b".into(),
        };
        assert_eq!(err.code(), Some(4001));
        assert!(err.is_tampering());

        assert_eq!(RegistryError::UnsignedTool("t".into()).code(), Some(4003));
        assert_eq!(
            RegistryError::UnsignedTool("t".into()).class(),
            ErrorClass::Policy
        );
        assert_eq!(RegistryError::NotFound("t".into()).code(), Some(4004));
        assert_eq!(RegistryError::MissingSchema("t".into()).code(), Some(4005));
        assert_eq!(RegistryError::MissingCredentials.code(), None);
        assert_eq!(
            RegistryError::MissingCredentials.to_string(),
            "missing tool repo credentials"
        );
        assert_eq!(
            RegistryError::CatalogStatus(503).to_string(),
            "received non-200 status: 503"
        );
    }
}
