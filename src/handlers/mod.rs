//! HTTP request handlers for the chatrelay API

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppResult;
use crate::middleware::request_id_middleware;
use crate::models::{ModelCache, ModelSelector, SelectionPolicy};
use crate::provider::{ChatInvoker, ModelCatalogClient};

pub mod health;
pub mod message;
pub mod model;

/// Build the full HTTP surface over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/message", post(message::handler))
        .route("/model", get(model::current))
        .route("/model/refresh", post(model::refresh))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers. The cache is
/// the one piece of shared mutable state in the service.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    cache: Arc<ModelCache>,
    invoker: Arc<ChatInvoker>,
}

impl AppState {
    /// Wire up catalog client, selector, cache, and invoker from config
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let catalog = Arc::new(ModelCatalogClient::new(&config)?);
        let selector = ModelSelector::new(SelectionPolicy::from_config(&config.selection));
        let cache = Arc::new(ModelCache::new(catalog, selector));
        let invoker = Arc::new(ChatInvoker::new(&config, cache.clone())?);

        Ok(Self {
            config,
            cache,
            invoker,
        })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the model cache
    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    /// Get reference to the chat invoker
    pub fn invoker(&self) -> &ChatInvoker {
        &self.invoker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[provider]
api_key = "gsk_test_key"
"#;
        toml::from_str(toml).expect("should parse test config")
    }

    #[test]
    fn test_appstate_new_creates_state() {
        let config = Arc::new(create_test_config());
        let state = AppState::new(config).expect("AppState::new should succeed");
        assert_eq!(state.config().server.port, 8080);
    }

    #[test]
    fn test_appstate_is_clonable() {
        let config = Arc::new(create_test_config());
        let state = AppState::new(config).expect("AppState::new should succeed");
        let state2 = state.clone();
        assert_eq!(state2.config().server.port, 8080);
    }

    #[tokio::test]
    async fn test_appstate_cache_starts_empty() {
        let config = Arc::new(create_test_config());
        let state = AppState::new(config).expect("AppState::new should succeed");
        assert_eq!(state.cache().get().await, None);
    }
}
