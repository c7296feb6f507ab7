//! # Warden Registry - Tool Integrity Stamps
//!
//! Registers MCP tool definitions, stamps them with a checksum and a schema
//! fingerprint, and re-validates that stamp on every lookup so a tampered
//! definition never reaches a model or an executor.
//!
//! ## Purpose
//!
//! 1. **Canonical JSON** - deterministic re-serialization so structurally
//!    equal documents hash identically.
//!
//! 2. **Checksum / Fingerprint** - SHA-256 over the canonical
//!    `{name, description, inputSchema}` projection, and over the canonical
//!    input schema.
//!
//! 3. **Tool Registry** - fail-closed store: stamps on registration,
//!    recomputes on every read, enforces a reject-unsigned policy.
//!
//! 4. **Catalog Sync and Snapshots** - all-or-nothing replacement from a
//!    remote trusted repository or a Sled snapshot.
//!
//! ## Threat Model
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Rug Pull | Description edited after approval | Checksum recomputed on read |
//! | Schema Swap | Input schema widened after approval | Checksum and fingerprint |
//! | Unsigned Injection | Tool inserted without a stamp | `reject_unsigned_tools` |
//! | Key Reordering | Same schema, different bytes | Canonicalization |
//! | Catalog Poisoning | Partial or mislabeled catalog | All-or-nothing replace |
//!
//! Not covered: `outputSchema` and `annotations` sit outside the checksum
//! projection and can change without tripping detection.
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐   stamp    ┌──────────────────┐   replace_all   ┌───────────────┐
//!  │ canonicalize │──────────▶ │   ToolRegistry   │ ◀────────────── │ CatalogClient │
//!  │ fingerprint  │ ◀───────── │ RwLock<HashMap>  │                 │  SledStore    │
//!  └──────────────┘  recompute └──────────────────┘                 └───────────────┘
//! ```
//!
//! ## References
//!
//! - **RFC 8785** - "JSON Canonicalization Scheme (JCS)"
//!   <https://www.rfc-editor.org/rfc/rfc8785>
//! - **NIST FIPS 180-4** - "Secure Hash Standard (SHS)"
//!   <https://csrc.nist.gov/publications/detail/fips/180/4/final>
//! - **Model Context Protocol** - tool definitions
//!   <https://modelcontextprotocol.io/>
//!
//! ## Usage
//!
//! ```rust
//! use warden_registry::{RegistryError, SecurityPolicy, Tool, ToolRegistry};
//! use serde_json::json;
//!
//! let registry = ToolRegistry::with_policy(true, SecurityPolicy {
//!     validate_checksums: true,
//!     reject_unsigned_tools: true,
//! });
//!
//! let tool = Tool::builder("read_file")
//!     .description("Read contents of a file")
//!     .input_schema(json!({
//!         "type": "object",
//!         "properties": { "path": { "type": "string" } },
//!         "required": ["path"]
//!     }))
//!     .read_only_hint(true)
//!     .destructive_hint(false)
//!     .build();
//!
//! registry.register_tool(tool).unwrap();
//!
//! match registry.get_tool("read_file") {
//!     Ok(tool) => println!("verified: {}", tool.security_metadata.checksum),
//!     Err(e) if e.is_tampering() => println!("TAMPERED: {e}"),
//!     Err(e) => println!("rejected: {e}"),
//! }
//!
//! assert!(matches!(registry.get_tool("nope"), Err(RegistryError::NotFound(_))));
//! ```

pub mod canonicalize;
pub mod catalog;
pub mod fingerprint;
pub mod models;
pub mod registry;
pub mod storage;

pub use catalog::CatalogClient;
pub use fingerprint::{
    schema_fingerprint, stamp_tool, tool_checksum, tool_fingerprint, verify_tool_integrity,
};
pub use models::{
    ErrorClass, Hash, RegistryError, Result, SecurityMetadata, Tool, ToolAnnotations,
    ToolBuilder, ToolSet, HASH_ALGORITHM,
};
pub use registry::{SecurityPolicy, ToolRegistry};
