//! The Warden gateway facade.
//!
//! [`Gateway`] owns the registry handle and the configuration, and applies
//! the registration policy before anything reaches the registry.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::Result;

use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use warden_firewall::validate_tool_description;
use warden_registry::storage::{restore_registry, snapshot_registry, SledStore, ToolStore};
use warden_registry::{CatalogClient, Tool, ToolRegistry, ToolSet};
use warden_validate::{
    validate_input, validate_input_value, validate_output, validate_submitted_tool,
    ToolValidationResult, ValidateError, Validation,
};

/// The unified MCP Warden facade.
///
/// # Security Model
///
/// - Registration: provenance policy, then description screening, then the
///   registry stamps the tool.
/// - Lookup: every read goes through the registry's re-verification. A tool
///   that fails it is reported as not found or not permitted.
/// - Calls: arguments and results are checked against the schemas of the
///   verified registry copy, never against caller-supplied ones.
///
/// # Example
///
/// ```rust
/// use warden_core::{Gateway, GatewayConfig};
/// use warden_registry::Tool;
/// use serde_json::json;
///
/// let gateway = Gateway::new(GatewayConfig::default());
/// gateway.register_tool(
///     Tool::builder("get_weather")
///         .description("Current weather for a city")
///         .input_schema(json!({
///             "type": "object",
///             "properties": {"location": {"type": "string"}},
///             "required": ["location"]
///         }))
///         .build(),
/// )?;
///
/// assert!(gateway.validate_tool_call("get_weather", br#"{"location": "Oslo"}"#).is_succeeded());
/// assert!(gateway.validate_tool_call("get_weather", br#"{}"#).is_failed());
/// assert!(gateway.validate_tool_call("rm_rf", br#"{}"#).is_error());
/// # Ok::<(), warden_core::GatewayError>(())
/// ```
pub struct Gateway {
    config: GatewayConfig,
    registry: Arc<ToolRegistry>,
}

impl Gateway {
    /// Creates a gateway with a fresh registry built from `config`.
    pub fn new(config: GatewayConfig) -> Self {
        let registry = ToolRegistry::with_policy(
            config.registry.security_enabled,
            config.registry.policy(),
        );
        Self::with_registry(config, Arc::new(registry))
    }

    /// Creates a gateway around an existing registry handle.
    pub fn with_registry(config: GatewayConfig, registry: Arc<ToolRegistry>) -> Self {
        info!(
            security_enabled = registry.security_enabled(),
            max_concurrency = config.validation.max_concurrency,
            "Warden gateway initialized"
        );
        Self { config, registry }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Registers a tool after the provenance and description checks.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::MissingProvenance`] when `require_provenance` is set
    ///   and the tool carries no source
    /// - [`GatewayError::Firewall`] when the description hides characters
    /// - [`GatewayError::Registry`] for anything the registry rejects
    pub fn register_tool(&self, tool: Tool) -> Result<()> {
        if self.config.registry.require_provenance && tool.security_metadata.source.is_empty() {
            warn!(tool = %tool.name, "Registration refused: no provenance source");
            return Err(GatewayError::MissingProvenance(tool.name));
        }

        if self.config.validation.scan_descriptions {
            validate_tool_description(&tool.description)?;
        }

        let name = tool.name.clone();
        self.registry.register_tool(tool)?;
        info!("Registered tool: {}", name);
        Ok(())
    }

    /// Verified copy of a registered tool.
    pub fn find_tool(&self, name: &str) -> Result<Tool> {
        self.registry
            .get_tool(name)
            .map_err(|source| GatewayError::ToolLookup {
                name: name.to_string(),
                source,
            })
    }

    /// Diagnostic listing. Not a trust boundary.
    pub fn list_tools(&self) -> ToolSet {
        self.registry.list_tools()
    }

    pub fn set_security_options(&self, validate_checksums: bool, reject_unsigned_tools: bool) {
        self.registry
            .set_security_options(validate_checksums, reject_unsigned_tools);
    }

    /// Validation record for one submitted tool.
    pub fn validate_tool(&self, tool: &Tool) -> ToolValidationResult {
        validate_submitted_tool(tool, self.config.validation.scan_descriptions)
    }

    /// Validates a batch concurrently, bounded by `max_concurrency`.
    ///
    /// Returns one record per input, sorted by name. A failing or panicking
    /// tool yields an invalid record without affecting its siblings.
    pub async fn validate_tools(&self, tools: Vec<Tool>) -> Vec<ToolValidationResult> {
        let scan = self.config.validation.scan_descriptions;
        let permits = Arc::new(Semaphore::new(
            self.config
                .validation
                .max_concurrency
                .clamp(1, Semaphore::MAX_PERMITS),
        ));
        let results = Arc::new(Mutex::new(Vec::with_capacity(tools.len())));
        let mut tasks = JoinSet::new();

        debug!(count = tools.len(), "Validating tool batch");

        for tool in tools {
            let permits = Arc::clone(&permits);
            let results = Arc::clone(&results);

            tasks.spawn(async move {
                let name = tool.name.clone();
                let record = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        match tokio::task::spawn_blocking(move || validate_submitted_tool(&tool, scan))
                            .await
                        {
                            Ok(record) => record,
                            Err(e) => {
                                error!(tool = %name, error = %e, "Tool validation task failed");
                                ToolValidationResult::invalid(name, format!("validation task failed: {e}"))
                            }
                        }
                    }
                    Err(e) => ToolValidationResult::invalid(name, format!("validation pool closed: {e}")),
                };
                results.lock().await.push(record);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Batch validation worker failed");
            }
        }

        let mut records = std::mem::take(&mut *results.lock().await);
        records.sort_by(|a, b| a.name.cmp(&b.name));

        let invalid = records.iter().filter(|r| !r.valid).count();
        info!(total = records.len(), invalid, "Tool batch validated");
        records
    }

    /// Checks raw call arguments against the verified registry copy of `name`.
    /// A failed lookup yields `Error`.
    pub fn validate_tool_call(&self, name: &str, arguments: &[u8]) -> Validation {
        match self.lookup_for_call(name) {
            Ok(tool) => validate_input(&tool, arguments),
            Err(outcome) => outcome,
        }
    }

    /// [`Gateway::validate_tool_call`] for already-decoded arguments.
    pub fn validate_tool_call_value(&self, name: &str, arguments: &serde_json::Value) -> Validation {
        match self.lookup_for_call(name) {
            Ok(tool) => validate_input_value(&tool, arguments),
            Err(outcome) => outcome,
        }
    }

    /// Checks a raw tool result against the verified registry copy of `name`.
    pub fn validate_tool_output(&self, name: &str, raw_result: &str) -> Validation {
        match self.lookup_for_call(name) {
            Ok(tool) => validate_output(&tool, raw_result),
            Err(outcome) => outcome,
        }
    }

    /// Screens the description, then re-verifies the registered definition
    /// of the same name.
    pub fn validate_tool_security(&self, tool: &Tool) -> Result<()> {
        validate_tool_description(&tool.description)?;
        self.find_tool(&tool.name)?;
        Ok(())
    }

    /// Replaces the registry contents with the remote catalog.
    pub async fn sync_catalog(&self) -> Result<usize> {
        let catalog = &self.config.catalog;
        let client = CatalogClient::new(
            catalog.url.as_deref(),
            catalog.api_key.as_deref(),
            catalog.timeout(),
        )?;
        Ok(client.sync(&self.registry).await?)
    }

    /// Opens the Sled snapshot at `registry.snapshot_path`.
    pub fn open_snapshot(&self) -> Result<SledStore> {
        Ok(SledStore::open(&self.config.registry.snapshot_path)?)
    }

    pub fn save_snapshot(&self, store: &dyn ToolStore) -> Result<usize> {
        Ok(snapshot_registry(&self.registry, store)?)
    }

    /// Replaces the registry contents with `store`. Stamps are not
    /// recomputed, so tampered entries fail on their next read.
    pub fn load_snapshot(&self, store: &dyn ToolStore) -> Result<usize> {
        Ok(restore_registry(&self.registry, store)?)
    }

    fn lookup_for_call(&self, name: &str) -> std::result::Result<Tool, Validation> {
        self.registry.get_tool(name).map_err(|e| {
            warn!(tool = %name, error = %e, "Call rejected: tool lookup failed");
            Validation::Error(ValidateError::ToolRejected {
                tool: name.to_string(),
                class: e.class(),
                reason: e.to_string(),
            })
        })
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("tools_count", &self.registry.len())
            .finish()
    }
}
