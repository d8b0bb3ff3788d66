//! Configuration loading for the archive endpoints and search defaults.
//!
//! Loads from a single YAML file. Every section is optional; a missing
//! file yields the built-in Copernicus defaults.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use catalogue_client::ClientConfig;
use serde::Deserialize;
use tracing::{debug, warn};

/// Root configuration for the fetch tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub search: SearchDefaults,
    /// Named areas of interest, WKT polygons keyed by region name.
    #[serde(default)]
    pub regions: HashMap<String, String>,
    #[serde(default)]
    pub inspect: InspectConfig,
}

/// Archive endpoint URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_catalogue_url")]
    pub catalogue_url: String,
    #[serde(default = "default_download_url")]
    pub download_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            catalogue_url: default_catalogue_url(),
            download_url: default_download_url(),
            token_url: default_token_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_catalogue_url() -> String {
    "https://catalogue.dataspace.copernicus.eu/odata/v1".to_string()
}

fn default_download_url() -> String {
    "https://download.dataspace.copernicus.eu/odata/v1".to_string()
}

fn default_token_url() -> String {
    "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token"
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    600
}

/// Search behaviour when the command line does not say otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchDefaults {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> u32 {
    20
}

/// Product inspection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    /// Channels read when none are named on the command line.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
        }
    }
}

fn default_channels() -> Vec<String> {
    vec![
        "CHL_NN".to_string(),
        "CHL_OC4ME".to_string(),
        "TSM_NN".to_string(),
    ]
}

impl ArchiveConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ArchiveConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded archive config");
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Client configuration for these endpoints.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            catalogue_url: self.endpoints.catalogue_url.clone(),
            download_url: self.endpoints.download_url.clone(),
            token_url: self.endpoints.token_url.clone(),
            request_timeout: Duration::from_secs(self.endpoints.request_timeout_secs),
        }
    }
}
