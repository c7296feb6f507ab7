//! # Snapshot Storage
//!
//! Persists stamped tool definitions so a registry can be rebuilt after a
//! restart. Snapshots hold tools exactly as the registry stored them,
//! stamps included.
//!
//! ## Threat Model
//!
//! - **Offline Tampering**: someone edits the database file between runs.
//!   Restores go through [`ToolRegistry::replace_all`], which never stamps,
//!   so an edited definition keeps its old stamp and fails on first read.
//! - **Partial Restore**: a corrupt record aborts the whole restore and the
//!   registry keeps its previous contents.
//!
//! ## Storage Structure
//!
//! | Tree | Key | Value |
//! |------|-----|-------|
//! | `tools` | tool name | JSON-encoded [`Tool`] |
//!
//! ## References
//!
//! - Sled documentation: <https://sled.rs/>

use crate::models::{RegistryError, Result, Tool};
use crate::registry::ToolRegistry;
use std::path::Path;
use tracing::{debug, info};

const TOOL_TREE: &str = "tools";

/// Persistence backend for registry snapshots.
pub trait ToolStore: Send + Sync {
    /// Inserts or overwrites one tool.
    fn save(&self, tool: &Tool) -> Result<()>;

    /// Every stored tool, ascending by name.
    fn load_all(&self) -> Result<Vec<Tool>>;

    /// Returns whether the tool existed.
    fn remove(&self, name: &str) -> Result<bool>;

    /// Drops every stored tool and writes `tools` in their place.
    fn replace_all(&self, tools: &[Tool]) -> Result<()>;
}

/// Sled-backed [`ToolStore`].
///
/// # Example
///
/// ```rust
/// use warden_registry::storage::{SledStore, ToolStore};
/// use warden_registry::Tool;
///
/// let store = SledStore::temporary().unwrap();
/// store.save(&Tool::builder("echo").build()).unwrap();
/// assert_eq!(store.load_all().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    tools: sled::Tree,
}

impl SledStore {
    /// Opens or creates a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        let tools = db.open_tree(TOOL_TREE)?;
        Ok(SledStore { db, tools })
    }

    /// In-memory store, discarded on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        let tools = db.open_tree(TOOL_TREE)?;
        Ok(SledStore { db, tools })
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Flushes pending writes to disk, returning the bytes written.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }
}

impl ToolStore for SledStore {
    fn save(&self, tool: &Tool) -> Result<()> {
        if tool.name.is_empty() {
            return Err(RegistryError::InvalidDefinition(
                "tool name must not be empty".to_string(),
            ));
        }
        self.tools
            .insert(tool.name.as_bytes(), serde_json::to_vec(tool)?)?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Tool>> {
        // Sled iterates keys in byte order, which for UTF-8 names is name order
        let mut tools = Vec::with_capacity(self.tools.len());
        for entry in self.tools.iter() {
            let (key, value) = entry?;
            let tool: Tool = serde_json::from_slice(&value)?;
            if tool.name.as_bytes() != key.as_ref() {
                return Err(RegistryError::InvalidDefinition(format!(
                    "snapshot key '{}' holds tool '{}'",
                    String::from_utf8_lossy(&key),
                    tool.name
                )));
            }
            tools.push(tool);
        }
        Ok(tools)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        Ok(self.tools.remove(name.as_bytes())?.is_some())
    }

    fn replace_all(&self, tools: &[Tool]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for entry in self.tools.iter() {
            let (key, _) = entry?;
            batch.remove(key);
        }
        for tool in tools {
            if tool.name.is_empty() {
                return Err(RegistryError::InvalidDefinition(
                    "tool name must not be empty".to_string(),
                ));
            }
            batch.insert(tool.name.as_bytes(), serde_json::to_vec(tool)?);
        }
        self.tools.apply_batch(batch)?;
        Ok(())
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("tools_count", &self.len())
            .finish()
    }
}

/// Writes every tool currently in `registry` to `store`, replacing what was
/// there. Returns the number of tools written.
pub fn snapshot_registry(registry: &ToolRegistry, store: &dyn ToolStore) -> Result<usize> {
    let set = registry.list_tools();
    store.replace_all(&set.tools)?;
    debug!(count = set.tools.len(), "Registry snapshot written");
    Ok(set.tools.len())
}

/// Replaces the contents of `registry` with the snapshot in `store`.
/// Returns the number of tools restored.
pub fn restore_registry(registry: &ToolRegistry, store: &dyn ToolStore) -> Result<usize> {
    let tools = store.load_all()?;
    let count = tools.len();
    registry.replace_all(tools)?;
    info!(count, "Registry restored from snapshot");
    Ok(count)
}
