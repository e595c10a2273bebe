//! Process-wide cache of the currently selected model
//!
//! A single optional slot: empty at start, populated by the first successful
//! selection, invalidated and repopulated on demand. There is no expiry
//! timer - invalidation is event-driven, either an explicit refresh request
//! or a stale-model signal from a failed completion call.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::ModelSelector;
use crate::provider::{CatalogSource, ModelId};

/// Cached model slot with explicit refresh
///
/// Shared across all in-flight requests. Concurrent refreshes are allowed to
/// run independently: selection is deterministic for a given catalog
/// snapshot, so redundant refreshes converge and last-write-wins is safe.
pub struct ModelCache {
    slot: RwLock<Option<ModelId>>,
    source: Arc<dyn CatalogSource>,
    selector: ModelSelector,
}

impl ModelCache {
    pub fn new(source: Arc<dyn CatalogSource>, selector: ModelSelector) -> Self {
        Self {
            slot: RwLock::new(None),
            source,
            selector,
        }
    }

    /// Read the cached model without side effects
    pub async fn get(&self) -> Option<ModelId> {
        self.slot.read().await.clone()
    }

    /// Return the cached model, refreshing it first if empty or forced.
    ///
    /// Performs at most one catalog round trip per call. Fetch failures are
    /// mapped to an empty catalog here, so callers only ever observe
    /// `Some(model)` or `None`. When selection yields nothing the slot stays
    /// empty and the next `ensure` will try the fetch again.
    pub async fn ensure(&self, force_refresh: bool) -> Option<ModelId> {
        if !force_refresh {
            if let Some(model) = self.slot.read().await.clone() {
                return Some(model);
            }
        }

        // Fetch outside the lock so slow catalogs don't block readers.
        let catalog = match self.source.fetch().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "catalog fetch failed, treating as empty");
                Vec::new()
            }
        };

        let selected = self.selector.select(&catalog);
        match &selected {
            Some(model) => tracing::info!(model = %model, "selected model"),
            None => tracing::warn!(
                catalog_size = catalog.len(),
                "no usable model found in catalog"
            ),
        }

        *self.slot.write().await = selected.clone();
        selected
    }
}
