//! Provider wire types for the OpenAI-compatible chat API
//!
//! Request and response bodies exchanged with the provider's listing and
//! completion endpoints. Field names follow the provider wire format exactly.

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod invoker;

pub use catalog::{CatalogError, CatalogSource, ModelCatalogClient};
pub use invoker::{ChatInvoker, CompletionError};

/// Opaque model identifier as returned by the provider catalog
///
/// No internal structure is assumed beyond case-insensitive substring
/// matching during selection.
pub type ModelId = String;

/// Message role in a chat transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message in a chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Build the fixed two-message transcript: one system prompt, one user turn.
///
/// No multi-turn history is retained; every invocation starts fresh.
pub fn build_transcript(system_prompt: &str, user_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_text.trim()),
    ]
}

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f64,
    pub top_p: f64,
    pub stream: bool,
}

/// Successful chat completion response body
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: String,
}

/// Provider error response body (`{"error": {"message": ...}}`)
#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub error: ProviderErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProviderErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// Extract the provider's error message from a raw error body.
///
/// Falls back to the raw body text when it is not the expected JSON shape,
/// matching how the provider's plain-text errors must still reach the user.
pub fn extract_error_message(raw_body: &str) -> String {
    match serde_json::from_str::<ProviderErrorBody>(raw_body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ => raw_body.to_string(),
    }
}
