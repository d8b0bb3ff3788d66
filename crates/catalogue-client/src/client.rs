//! Shared HTTP client and endpoint configuration.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::CatalogueError;

/// Archive endpoint configuration.
///
/// The defaults point at the Copernicus Data Space Ecosystem. Tests and
/// mirror deployments override the URLs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalogue OData base, queried for attributes and product pages.
    pub catalogue_url: String,
    /// Download OData base serving product payloads.
    pub download_url: String,
    /// Identity endpoint issuing access tokens.
    pub token_url: String,
    /// Per-request timeout. Product payloads run to hundreds of megabytes,
    /// so this covers the whole body read.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            catalogue_url: "https://catalogue.dataspace.copernicus.eu/odata/v1".to_string(),
            download_url: "https://download.dataspace.copernicus.eu/odata/v1".to_string(),
            token_url: "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token".to_string(),
            request_timeout: Duration::from_secs(600),
        }
    }
}

/// Async client for the product archive.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct CatalogueClient {
    pub(crate) http: Client,
    pub(crate) config: ClientConfig,
}

impl CatalogueClient {
    /// Create a client for the given endpoints.
    pub fn new(config: ClientConfig) -> Result<Self, CatalogueError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()?;

        debug!(catalogue = %config.catalogue_url, "Created catalogue client");
        Ok(Self { http, config })
    }

    /// Create a client for the Copernicus Data Space endpoints.
    pub fn with_defaults() -> Result<Self, CatalogueError> {
        Self::new(ClientConfig::default())
    }

    /// Endpoint configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL listing the filterable attributes of the archive collection.
    pub(crate) fn attributes_url(&self) -> String {
        format!(
            "{}/Attributes({})",
            self.config.catalogue_url.trim_end_matches('/'),
            odata_query::archive::COLLECTION_NAME
        )
    }
}
