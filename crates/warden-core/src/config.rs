//! Configuration types for MCP Warden.
//!
//! Sources, lowest to highest priority: built-in defaults, an optional TOML
//! file, then `WARDEN_`-prefixed environment variables with nested keys
//! split on `__` (`WARDEN_CATALOG__API_KEY`).

use crate::error::GatewayError;
use crate::Result;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use warden_registry::SecurityPolicy;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "WARDEN_";

/// Configuration for the Warden gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Tool registry configuration.
    pub registry: RegistryConfig,

    /// Remote tool catalog.
    pub catalog: CatalogConfig,

    /// Validation settings.
    pub validation: ValidationConfig,
}

/// Tool registry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Stamp on registration and allow read-time checks at all.
    pub security_enabled: bool,

    /// Recompute checksum and fingerprint on every read.
    pub validate_checksums: bool,

    /// Refuse tools missing either half of the stamp.
    pub reject_unsigned_tools: bool,

    /// Refuse registration of tools with no `secMetaData.source`.
    pub require_provenance: bool,

    /// Sled snapshot location.
    pub snapshot_path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            security_enabled: true,
            validate_checksums: true,
            reject_unsigned_tools: true,
            require_provenance: false,
            snapshot_path: PathBuf::from("./warden_tools.db"),
        }
    }
}

impl RegistryConfig {
    pub fn policy(&self) -> SecurityPolicy {
        SecurityPolicy {
            validate_checksums: self.validate_checksums,
            reject_unsigned_tools: self.reject_unsigned_tools,
        }
    }
}

/// Remote tool catalog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: Option<String>,

    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: 3,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Upper bound on concurrently validated tools in a batch.
    pub max_concurrency: usize,

    /// Screen descriptions for hidden Unicode on registration and validation.
    pub scan_descriptions: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            scan_descriptions: true,
        }
    }
}

impl GatewayConfig {
    /// Loads defaults, then `path` if given, then `WARDEN_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// [`GatewayConfig::load`] with a caller-chosen environment prefix.
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(GatewayConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(GatewayError::ConfigNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(env_prefix).split("__"));

        figment
            .extract()
            .map_err(|e| GatewayError::Config(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.registry.security_enabled);
        assert!(config.registry.validate_checksums);
        assert!(config.registry.reject_unsigned_tools);
        assert!(!config.registry.require_provenance);
        assert_eq!(config.catalog.url, None);
        assert_eq!(config.catalog.timeout(), Duration::from_secs(3));
        assert_eq!(config.validation.max_concurrency, 8);
        assert!(config.validation.scan_descriptions);
    }

    #[test]
    fn test_config_serialization() {
        let config = GatewayConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GatewayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[registry]\nreject_unsigned_tools = false\n\n[catalog]\nurl = \"http://localhost:9000/tools\"\ntimeout_secs = 10"
        )
        .unwrap();

        let config = GatewayConfig::load_with_prefix(Some(&path), "WARDEN_TEST_TOML_").unwrap();
        assert!(!config.registry.reject_unsigned_tools);
        assert!(config.registry.validate_checksums);
        assert_eq!(config.catalog.url.as_deref(), Some("http://localhost:9000/tools"));
        assert_eq!(config.catalog.timeout_secs, 10);
        assert_eq!(config.validation.max_concurrency, 8);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "[validation]\nmax_concurrency = 2\n").unwrap();

        std::env::set_var("WARDEN_TEST_ENV_VALIDATION__MAX_CONCURRENCY", "16");
        std::env::set_var("WARDEN_TEST_ENV_CATALOG__API_KEY", "secret");
        let config = GatewayConfig::load_with_prefix(Some(&path), "WARDEN_TEST_ENV_").unwrap();
        std::env::remove_var("WARDEN_TEST_ENV_VALIDATION__MAX_CONCURRENCY");
        std::env::remove_var("WARDEN_TEST_ENV_CATALOG__API_KEY");

        assert_eq!(config.validation.max_concurrency, 16);
        assert_eq!(config.catalog.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GatewayConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, GatewayError::ConfigNotFound(_)));
    }

    #[test]
    fn test_malformed_value_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "[validation]\nmax_concurrency = \"many\"\n").unwrap();
        let err = GatewayConfig::load_with_prefix(Some(&path), "WARDEN_TEST_BAD_").unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }
}
