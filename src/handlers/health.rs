//! Health check endpoint
//!
//! Provides a simple health check for monitoring and load balancers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Whether a model is currently cached
    pub model_selected: bool,
}

/// Health check handler
///
/// Returns 200 OK regardless of model state; `model_selected` tells
/// monitoring whether the cache currently holds a usable model. Reads the
/// slot without triggering a refresh.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let model_selected = state.cache().get().await.is_some();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            model_selected,
        }),
    )
}
