//! # Tool Registry - Main Facade
//!
//! In-memory store of tool definitions. Attaches integrity stamps on
//! registration and re-verifies them on every read.
//!
//! ## Threat Model
//!
//! | Threat | Defense |
//! |--------|---------|
//! | Rug Pull (definition edited after approval) | Checksum recomputed on every `get_tool` |
//! | Schema Swap | Fingerprint recomputed on every `get_tool` |
//! | Unsigned Injection | `reject_unsigned_tools` policy |
//! | Aliasing (caller mutates a stored tool) | Reads return clones |
//!
//! ## Lifecycle
//!
//! ```text
//!   Unstamped ──register_tool──▶ Stamped ──get_tool──▶ Verified | Rejected
//! ```
//!
//! Verified and Rejected are never stored. Every read recomputes the stamp,
//! and a mismatch is never healed by re-stamping: the only way back to a
//! readable entry is another `register_tool` with fresh content.
//!
//! ## Concurrency
//!
//! All methods take `&self`. The map sits behind an `RwLock`: readers run
//! concurrently, writers are serialized, and a freshly registered tool is
//! visible to the next `get_tool` on any thread. Share it through `Arc`.

use crate::fingerprint::{tool_checksum, tool_fingerprint};
use crate::models::{RegistryError, Result, Tool, ToolSet, HASH_ALGORITHM};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Read-time verification policy.
///
/// Only consulted when the registry was created with security enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPolicy {
    /// Recompute and compare checksum and fingerprint on every read.
    pub validate_checksums: bool,

    /// Refuse to return tools missing either half of the stamp.
    pub reject_unsigned_tools: bool,
}

/// The tool registry.
///
/// # Example
///
/// ```rust
/// use warden_registry::{SecurityPolicy, Tool, ToolRegistry};
/// use serde_json::json;
///
/// let registry = ToolRegistry::with_policy(true, SecurityPolicy {
///     validate_checksums: true,
///     reject_unsigned_tools: true,
/// });
///
/// registry.register_tool(
///     Tool::builder("echo")
///         .description("Echo the input back")
///         .input_schema(json!({"type": "object", "properties": {"text": {"type": "string"}}}))
///         .build(),
/// ).unwrap();
///
/// let tool = registry.get_tool("echo").unwrap();
/// assert!(!tool.security_metadata.checksum.is_empty());
/// ```
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Tool>>,
    security_enabled: bool,
    policy: RwLock<SecurityPolicy>,
}

impl ToolRegistry {
    /// Creates an empty registry with both read-time checks off.
    pub fn new(security_enabled: bool) -> Self {
        Self::with_policy(security_enabled, SecurityPolicy::default())
    }

    pub fn with_policy(security_enabled: bool, policy: SecurityPolicy) -> Self {
        ToolRegistry {
            tools: RwLock::new(HashMap::new()),
            security_enabled,
            policy: RwLock::new(policy),
        }
    }

    pub fn security_enabled(&self) -> bool {
        self.security_enabled
    }

    pub fn policy(&self) -> SecurityPolicy {
        *self.policy.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reconfigures the read-time policy. Applies from the next read on;
    /// stored tools are not re-verified.
    pub fn set_security_options(&self, validate_checksums: bool, reject_unsigned_tools: bool) {
        let mut policy = self.policy.write().unwrap_or_else(PoisonError::into_inner);
        *policy = SecurityPolicy {
            validate_checksums,
            reject_unsigned_tools,
        };
        info!(
            validate_checksums,
            reject_unsigned_tools, "Registry security policy updated"
        );
    }

    /// Registers a tool, overwriting any existing entry with the same name.
    ///
    /// With security enabled, a missing checksum or fingerprint is computed
    /// and attached. Stamp fields the caller already supplied are kept as
    /// given, so a forged stamp is stored as-is and fails on read.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidDefinition`] for an empty name
    /// - [`RegistryError::MissingSchema`] when a fingerprint is needed but
    ///   the tool declares no input schema
    pub fn register_tool(&self, mut tool: Tool) -> Result<()> {
        if tool.name.is_empty() {
            return Err(RegistryError::InvalidDefinition(
                "tool name must not be empty".to_string(),
            ));
        }

        if self.security_enabled {
            if tool.security_metadata.checksum.is_empty() {
                tool.security_metadata.checksum = tool_checksum(&tool)?;
            }
            if tool.security_metadata.signature.is_empty() {
                tool.security_metadata.signature = tool_fingerprint(&tool)?;
            }
        }

        debug!(tool = %tool.name, "Registering tool");
        let replaced = self.write_tools().insert(tool.name.clone(), tool);
        if let Some(previous) = replaced {
            info!(tool = %previous.name, "Tool definition replaced");
        }
        Ok(())
    }

    /// Returns a copy of the named tool after re-verifying its stamp.
    ///
    /// Checks, in order: existence, checksum, fingerprint (when
    /// `validate_checksums`), then stamp presence (when
    /// `reject_unsigned_tools`). The tool is never returned on failure.
    pub fn get_tool(&self, name: &str) -> Result<Tool> {
        let tool = self
            .read_tools()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        if !self.security_enabled {
            return Ok(tool);
        }

        let policy = self.policy();

        if policy.validate_checksums {
            let computed = tool_checksum(&tool)?;
            if computed != tool.security_metadata.checksum {
                warn!(
                    tool = %name,
                    stored = %tool.security_metadata.checksum,
                    computed = %computed,
                    "SECURITY ALERT: tool checksum validation failed"
                );
                return Err(RegistryError::ChecksumMismatch {
                    name: name.to_string(),
                    stored: tool.security_metadata.checksum.clone(),
                    computed,
                });
            }

            let computed = tool_fingerprint(&tool)?;
            if computed != tool.security_metadata.signature {
                warn!(
                    tool = %name,
                    stored = %tool.security_metadata.signature,
                    computed = %computed,
                    "SECURITY ALERT: schema fingerprint validation failed"
                );
                return Err(RegistryError::FingerprintMismatch {
                    name: name.to_string(),
                    stored: tool.security_metadata.signature.clone(),
                    computed,
                });
            }
        }

        if policy.reject_unsigned_tools && tool.security_metadata.is_unstamped() {
            warn!(tool = %name, "SECURITY ALERT: unsigned tool rejected");
            return Err(RegistryError::UnsignedTool(name.to_string()));
        }

        Ok(tool)
    }

    /// All tools ascending by name. Performs no re-verification.
    pub fn list_tools(&self) -> ToolSet {
        let mut tools: Vec<Tool> = self.read_tools().values().cloned().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));

        ToolSet {
            tools,
            security_enabled: self.security_enabled,
            schema_fingerprint_algo: HASH_ALGORITHM.to_string(),
            checksum_algo: HASH_ALGORITHM.to_string(),
        }
    }

    /// Replaces the whole map in one step. Used by catalog sync and snapshot
    /// restore.
    ///
    /// Tools are stored exactly as given: nothing is stamped, so tampered or
    /// unsigned entries surface on the next read. If any tool has an empty
    /// name the registry is left untouched.
    pub fn replace_all(&self, tools: Vec<Tool>) -> Result<()> {
        let mut next = HashMap::with_capacity(tools.len());
        for tool in tools {
            if tool.name.is_empty() {
                return Err(RegistryError::InvalidDefinition(
                    "tool name must not be empty".to_string(),
                ));
            }
            next.insert(tool.name.clone(), tool);
        }

        let count = next.len();
        *self.write_tools() = next;
        info!(count, "Registry contents replaced");
        Ok(())
    }

    /// Removes a tool, returning the stored definition if there was one.
    pub fn remove_tool(&self, name: &str) -> Option<Tool> {
        self.write_tools().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read_tools().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read_tools().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_tools().is_empty()
    }

    fn read_tools(&self) -> RwLockReadGuard<'_, HashMap<String, Tool>> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tools(&self) -> RwLockWriteGuard<'_, HashMap<String, Tool>> {
        self.tools.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Edits a stored tool in place, skipping registration.
    #[cfg(test)]
    pub(crate) fn tamper<F: FnOnce(&mut Tool)>(&self, name: &str, edit: F) {
        if let Some(tool) = self.write_tools().get_mut(name) {
            edit(tool);
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools_count", &self.len())
            .field("security_enabled", &self.security_enabled)
            .field("policy", &self.policy())
            .finish()
    }
}
