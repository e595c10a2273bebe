//! Model inspection endpoints
//!
//! Expose the cached model choice and allow an operator to force a refresh,
//! equivalent to a bot's `/model` and `/refreshmodel` commands.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::handlers::AppState;

/// Cached model response; `model` is null when nothing is selected
#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub model: Option<String>,
}

/// GET /model - current selection, populating the cache if empty
pub async fn current(State(state): State<AppState>) -> Json<ModelResponse> {
    let model = state.cache().ensure(false).await;
    Json(ModelResponse { model })
}

/// POST /model/refresh - discard the cached choice and reselect
pub async fn refresh(State(state): State<AppState>) -> Json<ModelResponse> {
    let model = state.cache().ensure(true).await;
    tracing::info!(model = ?model, "model cache refreshed by operator");
    Json(ModelResponse { model })
}
