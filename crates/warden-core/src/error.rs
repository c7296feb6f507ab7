//! Error types for MCP Warden Core.

use std::path::PathBuf;
use thiserror::Error;
use warden_firewall::FirewallError;
use warden_registry::{ErrorClass, RegistryError};

/// Core error type for gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Registry error passthrough.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Hidden characters in a description.
    #[error("description rejected: {0}")]
    Firewall(#[from] FirewallError),

    /// Lookup of a registered tool failed for any reason.
    #[error("tool '{name}' not found or not permitted")]
    ToolLookup {
        name: String,
        #[source]
        source: RegistryError,
    },

    /// Registration without `secMetaData.source` under a provenance policy.
    #[error("tool '{0}' has no provenance source")]
    MissingProvenance(String),

    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("configuration error: {0}")]
    Config(#[source] Box<figment::Error>),
}

impl GatewayError {
    pub fn class(&self) -> ErrorClass {
        match self {
            GatewayError::Registry(e) => e.class(),
            GatewayError::ToolLookup { source, .. } => source.class(),
            GatewayError::Firewall(FirewallError::HiddenCharacters { .. }) => ErrorClass::Content,
            GatewayError::Firewall(FirewallError::TooLarge { .. }) => ErrorClass::Structural,
            GatewayError::MissingProvenance(_) => ErrorClass::Policy,
            GatewayError::ConfigNotFound(_) | GatewayError::Config(_) => ErrorClass::Structural,
        }
    }
}
