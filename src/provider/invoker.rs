//! Chat completion invoker with stale-model recovery
//!
//! Drives one completion call end to end: pick the cached model, call the
//! provider, classify the outcome. A 400 carrying a stale-model signal
//! triggers exactly one cache refresh and retry; everything else is terminal.
//! `send` always yields a user-displayable string, never an error.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ModelCache;
use crate::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, build_transcript, extract_error_message,
};

/// Error phrases the provider uses when a model id is no longer served.
///
/// Matched case-insensitively as substrings against the 400 error message.
const STALE_MODEL_SIGNALS: [&str; 5] = [
    "decommissioned",
    "no longer supported",
    "does not exist",
    "not found",
    "unknown model",
];

/// Classified outcome of one completion attempt
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transport-level failure: timeout, DNS, connection refused
    #[error("cannot reach provider: {0}")]
    Network(String),

    /// 400 whose error message signals the model was decommissioned.
    ///
    /// The only recoverable variant: triggers one cache refresh and retry.
    #[error("model {model} no longer served: {message}")]
    StaleModel { model: String, message: String },

    /// 401: invalid or expired credentials
    #[error("invalid or expired credentials")]
    Auth,

    /// 403: access to the model is forbidden
    #[error("access forbidden")]
    Forbidden,

    /// 429: provider rate limit
    #[error("rate limited by provider")]
    RateLimited,

    /// 5xx upstream failure
    #[error("provider server error (status {0})")]
    Server(u16),

    /// 200 whose body did not contain `choices[0].message.content`
    #[error("unparseable completion response: {0}")]
    Parse(String),

    /// Any other status, including a stale-signal 400 after the one retry
    #[error("provider returned status {status}: {message}")]
    Other { status: u16, message: String },
}

impl CompletionError {
    /// True when the error signals a stale cached model worth one retry
    pub fn is_stale_model(&self) -> bool {
        matches!(self, CompletionError::StaleModel { .. })
    }
}

fn is_stale_signal(message: &str) -> bool {
    let lower = message.to_lowercase();
    STALE_MODEL_SIGNALS.iter().any(|sig| lower.contains(sig))
}

/// Issues chat completions against the cached model
pub struct ChatInvoker {
    http: reqwest::Client,
    chat_url: String,
    api_key: String,
    system_prompt: String,
    temperature: f64,
    top_p: f64,
    cache: Arc<ModelCache>,
}

impl ChatInvoker {
    /// Build an invoker with the configured completion URL and timeout
    pub fn new(config: &Config, cache: Arc<ModelCache>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider.chat_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            chat_url: config.provider.chat_url.clone(),
            api_key: config.provider.api_key().to_string(),
            system_prompt: config.chat.system_prompt.clone(),
            temperature: config.chat.temperature,
            top_p: config.chat.top_p,
            cache,
        })
    }

    /// Relay one user message to the provider and return a displayable reply.
    ///
    /// Every failure path is folded into a user-facing string here; this
    /// method cannot fail. On a stale-model 400 the cache is force-refreshed
    /// and the call retried exactly once - a second stale failure falls
    /// through to the generic terminal message.
    pub async fn send(&self, user_text: &str) -> String {
        let Some(mut model) = self.cache.ensure(false).await else {
            return Self::no_model_message();
        };

        let messages = build_transcript(&self.system_prompt, user_text);
        let mut retried = false;

        loop {
            match self.try_complete(&model, &messages).await {
                Ok(text) => return text,
                Err(err) if err.is_stale_model() && !retried => {
                    retried = true;
                    tracing::warn!(
                        model = %model,
                        error = %err,
                        "cached model rejected by provider, refreshing selection"
                    );
                    match self.cache.ensure(true).await {
                        Some(refreshed) => model = refreshed,
                        None => return Self::no_model_message(),
                    }
                }
                Err(err) => {
                    tracing::warn!(model = %model, error = %err, "completion failed");
                    return Self::user_message(&err);
                }
            }
        }
    }

    /// One completion attempt against a specific model, classified
    async fn try_complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        let payload = CompletionRequest {
            model,
            messages,
            temperature: self.temperature,
            top_p: self.top_p,
            stream: false,
        };

        let response = self
            .http
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            let parsed: CompletionResponse = response
                .json()
                .await
                .map_err(|e| CompletionError::Parse(e.to_string()))?;
            return parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| CompletionError::Parse("response has no choices".to_string()));
        }

        let raw_body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&raw_body);

        Err(match status.as_u16() {
            400 if is_stale_signal(&message) => CompletionError::StaleModel {
                model: model.to_string(),
                message,
            },
            401 => CompletionError::Auth,
            403 => CompletionError::Forbidden,
            429 => CompletionError::RateLimited,
            code if code >= 500 => CompletionError::Server(code),
            code => CompletionError::Other {
                status: code,
                message,
            },
        })
    }

    fn no_model_message() -> String {
        "No AI model is currently available.".to_string()
    }

    /// Map a terminal classification to its user-facing reply
    fn user_message(err: &CompletionError) -> String {
        match err {
            CompletionError::Network(detail) => {
                format!("Cannot connect to the AI provider: {detail}")
            }
            CompletionError::Parse(detail) => {
                format!("Could not parse the AI response: {detail}")
            }
            CompletionError::Auth => "API key is invalid or expired.".to_string(),
            CompletionError::Forbidden => "Access to the model is forbidden.".to_string(),
            CompletionError::RateLimited => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            CompletionError::Server(_) => {
                "The AI provider is having trouble. Please try again later.".to_string()
            }
            // A stale failure that already consumed its retry lands here,
            // indistinguishable from any other unexpected 400.
            CompletionError::StaleModel { message, .. } => {
                format!("Unexpected provider error 400: {message}")
            }
            CompletionError::Other { status, message } => {
                format!("Unexpected provider error {status}: {message}")
            }
        }
    }
}
