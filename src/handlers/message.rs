//! Inbound message endpoint - the MessageRouter boundary
//!
//! Receives a chat-scoped identifier plus raw text, relays the text through
//! the invoker, and returns the reply. Messages from chats outside the
//! configured allow-list (and empty messages) are silently ignored with 204,
//! mirroring how a group bot stays quiet in foreign chats.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::handlers::AppState;
use crate::middleware::RequestId;

/// Marker appended to replies cut at the character budget
const TRUNCATION_MARKER: &str = "\n\n…(shortened)";

/// Fallback reply when the invoker yields an empty string
const EMPTY_REPLY_FALLBACK: &str = "No response received from the AI.";

/// Inbound message from the front-end
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Chat-scoped identifier, checked against the allow-list
    pub chat_id: String,
    /// Raw user text
    pub text: String,
}

/// Outbound reply
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub reply: String,
}

/// Message handler
///
/// Truncation to the reply character budget happens here at the boundary,
/// never inside the invoker: other boundaries may apply different limits.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<MessageRequest>,
) -> Response {
    if let Some(allowed) = state.config().chat.allowed_chat()
        && request.chat_id != allowed
    {
        tracing::debug!(
            request_id = %request_id,
            chat_id = %request.chat_id,
            "ignoring message from chat outside allow-list"
        );
        return StatusCode::NO_CONTENT.into_response();
    }

    let text = request.text.trim();
    if text.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    tracing::info!(
        request_id = %request_id,
        chat_id = %request.chat_id,
        text_chars = text.chars().count(),
        "relaying message"
    );

    let reply = state.invoker().send(text).await;
    let reply = if reply.is_empty() {
        EMPTY_REPLY_FALLBACK.to_string()
    } else {
        truncate_reply(&reply, state.config().chat.max_reply_chars)
    };

    tracing::info!(
        request_id = %request_id,
        reply_chars = reply.chars().count(),
        "reply ready"
    );

    (StatusCode::OK, Json(MessageResponse { reply })).into_response()
}

/// Cut `reply` to at most `budget` characters, appending a marker when cut.
///
/// Operates on chars, not bytes, so multi-byte text is never split mid
/// character. Deterministic: the same input always produces the same output.
fn truncate_reply(reply: &str, budget: usize) -> String {
    if reply.chars().count() <= budget {
        return reply.to_string();
    }
    let mut truncated: String = reply.chars().take(budget).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
