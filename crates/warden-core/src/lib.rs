//! # MCP Warden Core
//!
//! Gateway facade for the Model Context Protocol tool boundary.
//! Owns the registry handle and applies registration policy, batch
//! validation and registry-backed call checks.
//!
//! ## Threat Coverage
//!
//! | Layer | Component | Threats Blocked |
//! |-------|-----------|-----------------|
//! | Identity | Tool Registry | Rug pulls, schema swaps, unsigned injection |
//! | Content | Description Firewall | Tag smuggling, Trojan Source, zero-width splitting |
//! | Contract | Schema Validator | Argument injection, unschematized tools, result poisoning |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        MCP WARDEN CORE                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │                    ┌─────────────────┐                          │
//! │                    │     Gateway     │  ← Unified Facade        │
//! │                    └────────┬────────┘                          │
//! │                             │                                   │
//! │         ┌───────────────────┼───────────────────┐               │
//! │         ▼                   ▼                   ▼               │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐          │
//! │  │    Tool     │    │ Description │    │   Schema    │          │
//! │  │  Registry   │    │  Firewall   │    │  Validator  │          │
//! │  └─────────────┘    └─────────────┘    └─────────────┘          │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use warden_core::{Gateway, GatewayConfig};
//! use warden_registry::Tool;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let gateway = Gateway::new(GatewayConfig::default());
//!
//! let tools = vec![
//!     Tool::builder("read_file").description("Read a file").build(),
//!     Tool::builder("fetch").description("Fetch a URL\u{200B}").build(),
//! ];
//!
//! for record in gateway.validate_tools(tools).await {
//!     println!("{}: valid={} {}", record.name, record.valid, record.error);
//! }
//! # }
//! ```
//!
//! ## Security Notes
//!
//! - Registration order: provenance policy → description scan → stamp
//! - Lookups are fail-closed: a tool that fails re-verification is never
//!   returned
//! - Call checks use the verified registry copy's schemas
//! - Batch validation reports per tool; one bad tool never aborts the batch
//!
//! ## References
//!
//! - MCP Specification: <https://modelcontextprotocol.io/>

mod config;
mod error;
mod gateway;

pub use config::{CatalogConfig, GatewayConfig, RegistryConfig, ValidationConfig, ENV_PREFIX};
pub use error::GatewayError;
pub use gateway::Gateway;

// Re-export component types for convenience
pub use warden_firewall::{detect_hidden_unicode, DetectedCharInfo};
pub use warden_registry::{ErrorClass, SecurityPolicy, Tool, ToolRegistry, ToolSet};
pub use warden_validate::{ExecutionStatus, ToolValidationResult, Validation, ValidationReport};

/// Core result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
