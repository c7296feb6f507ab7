//! # Remote Tool Catalog
//!
//! Pulls the trusted tool set from an external repository and swaps it into
//! a [`ToolRegistry`] in one step.
//!
//! ## Protocol
//!
//! A single `GET <url>` carrying the API key in the `X-API-Key` header. The
//! body is a JSON object mapping tool name to tool definition. Anything other
//! than a `200` with a decodable body aborts the sync and the registry keeps
//! its previous contents. There is no retry here; retry policy belongs to
//! the caller.
//!
//! ## Threat Model
//!
//! - **Partial Poisoning**: a response that decodes only halfway must not
//!   leave half a catalog behind. Decoding finishes before the swap starts.
//! - **Key Confusion**: an entry whose map key disagrees with its `name`
//!   could shadow another tool. The whole response is rejected.
//! - **Hung Repository**: every request carries a bounded timeout.

use crate::models::{RegistryError, Result, Tool};
use crate::registry::ToolRegistry;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header carrying the catalog API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// HTTP client for the trusted tool repository.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl CatalogClient {
    /// Builds a client. No network traffic happens here.
    ///
    /// # Errors
    ///
    /// [`RegistryError::MissingCredentials`] if either the URL or the API key
    /// is absent or empty.
    pub fn new(url: Option<&str>, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let (url, api_key) = match (url, api_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => (url, key),
            _ => return Err(RegistryError::MissingCredentials),
        };

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(CatalogClient {
            http,
            url: url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches and decodes the catalog, ascending by name.
    pub async fn fetch(&self) -> Result<Vec<Tool>> {
        debug!(url = %self.url, "Fetching tool catalog");

        let response = self
            .http
            .get(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!(url = %self.url, status = status.as_u16(), "Tool catalog request rejected");
            return Err(RegistryError::CatalogStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let entries: BTreeMap<String, Tool> = serde_json::from_slice(&body)
            .map_err(|e| RegistryError::CatalogDecode(e.to_string()))?;

        let mut tools = Vec::with_capacity(entries.len());
        for (key, mut tool) in entries {
            if tool.name.is_empty() {
                tool.name = key;
            } else if tool.name != key {
                return Err(RegistryError::CatalogDecode(format!(
                    "entry '{}' declares name '{}'",
                    key, tool.name
                )));
            }
            tools.push(tool);
        }
        Ok(tools)
    }

    /// Fetches the catalog and replaces the registry contents with it.
    /// Returns the number of tools loaded.
    pub async fn sync(&self, registry: &ToolRegistry) -> Result<usize> {
        let tools = self.fetch().await?;
        let count = tools.len();
        registry.replace_all(tools)?;
        info!(url = %self.url, count, "Tool catalog synchronized");
        Ok(count)
    }
}
