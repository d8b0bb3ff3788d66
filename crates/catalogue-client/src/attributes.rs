//! Attribute catalogue resolution and caching.
//!
//! The archive publishes which product attributes are filterable, and with
//! which value types, at a dedicated endpoint. That list changes on the
//! order of months, so it is fetched once per process and memoized.
//! Concurrent first callers share a single in-flight fetch. The cache is
//! keyed by the full attributes URL, so clients pointed at different
//! archives do not see each other's catalogues.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use odata_query::AttributeDescriptor;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::client::CatalogueClient;
use crate::error::CatalogueError;

/// Shared, immutable attribute catalogue.
pub type SharedDescriptors = Arc<Vec<AttributeDescriptor>>;

type CacheSlot = Arc<OnceCell<SharedDescriptors>>;

static CACHE: OnceLock<Mutex<HashMap<String, CacheSlot>>> = OnceLock::new();

/// Slot for the given attributes URL, created on first use.
fn cache_slot(url: &str) -> CacheSlot {
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut slots = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    slots.entry(url.to_string()).or_default().clone()
}

/// Drop every cached attribute catalogue.
///
/// Not called in normal operation. Long-lived tools use it to pick up
/// server-side attribute changes without restarting. Slots already handed
/// to in-flight fetches stay alive until those calls finish.
pub fn reset_attribute_cache() {
    if let Some(cache) = CACHE.get() {
        let mut slots = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slots.clear();
    }
}

impl CatalogueClient {
    /// Filterable attributes of the archive collection.
    ///
    /// The first call fetches and caches; later calls return the cached
    /// list without touching the network. A failed fetch leaves the cache
    /// unset, so the next caller retries.
    pub async fn attributes(&self) -> Result<SharedDescriptors, CatalogueError> {
        let url = self.attributes_url();
        let slot = cache_slot(&url);

        if let Some(cached) = slot.get() {
            debug!(url = %url, "Attribute catalogue cache hit");
            return Ok(cached.clone());
        }

        let descriptors = slot
            .get_or_try_init(|| async { self.fetch_attributes(&url).await })
            .await?;

        Ok(descriptors.clone())
    }

    async fn fetch_attributes(&self, url: &str) -> Result<SharedDescriptors, CatalogueError> {
        debug!(url = %url, "Fetching attribute catalogue");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogueError::CatalogUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogueError::CatalogUnavailable(format!(
                "{url} returned {status}"
            )));
        }

        // The endpoint answers with a bare JSON array, not an OData page.
        let descriptors: Vec<AttributeDescriptor> = response
            .json()
            .await
            .map_err(|e| CatalogueError::CatalogUnavailable(e.to_string()))?;

        info!(url = %url, count = descriptors.len(), "Attribute catalogue cached");
        Ok(Arc::new(descriptors))
    }
}
