//! Catalog listing client for the provider's model inventory
//!
//! Fetches the set of model ids currently offered by the provider. The
//! catalog is dynamic: models appear and get decommissioned over time, so it
//! is re-fetched on every cache refresh and never persisted.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::provider::ModelId;

/// Errors from a catalog fetch
///
/// These never propagate past [`crate::models::ModelCache`]: the cache maps
/// every failure to an empty catalog with a diagnostic, so a provider outage
/// degrades to "no model available" instead of crashing a request.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure: timeout, DNS, connection refused
    #[error("catalog request failed: {0}")]
    Network(String),

    /// Response body was not the expected JSON shape
    #[error("catalog response unparseable: {0}")]
    Parse(String),
}

/// Source of catalog snapshots
///
/// Seam for dependency injection: production uses [`ModelCatalogClient`],
/// tests can supply an in-memory catalog without network calls.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the current catalog snapshot, in provider order
    async fn fetch(&self) -> Result<Vec<ModelId>, CatalogError>;
}

/// HTTP client for the provider's model listing endpoint
pub struct ModelCatalogClient {
    http: reqwest::Client,
    models_url: String,
    api_key: String,
}

impl ModelCatalogClient {
    /// Build a client with the configured listing URL and timeout
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider.catalog_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            models_url: config.provider.models_url.clone(),
            api_key: config.provider.api_key().to_string(),
        })
    }

    /// Extract model ids from a listing body, skipping malformed entries.
    ///
    /// The provider returns `{"data": [{"id": "...", ...}, ...]}`. Entries
    /// that are not objects or lack a non-empty string `id` are dropped
    /// silently rather than failing the whole listing.
    fn extract_ids(body: &Value) -> Vec<ModelId> {
        body.get("data")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("id").and_then(Value::as_str))
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogSource for ModelCatalogClient {
    async fn fetch(&self) -> Result<Vec<ModelId>, CatalogError> {
        let response = self
            .http
            .get(&self.models_url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body,
                "model listing returned non-200, treating catalog as empty"
            );
            return Ok(Vec::new());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let ids = Self::extract_ids(&body);
        tracing::debug!(model_count = ids.len(), "fetched provider catalog");
        Ok(ids)
    }
}
