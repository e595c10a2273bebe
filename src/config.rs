//! Configuration management for chatrelay
//!
//! Parses TOML configuration files and provides typed access to settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Environment variable that overrides `provider.api_key` from the file.
///
/// Lets deployments keep the credential out of the config file entirely.
pub const API_KEY_ENV: &str = "CHATRELAY_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Provider endpoint configuration
///
/// `api_key` is private to keep the validated credential immutable after
/// loading. Use [`ProviderConfig::api_key`] to read it; startup logging must
/// go through [`mask`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default)]
    api_key: String,
    #[serde(default = "default_models_url")]
    pub models_url: String,
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    /// Timeout for the catalog listing request in seconds
    #[serde(default = "default_catalog_timeout")]
    pub catalog_timeout_seconds: u64,
    /// Timeout for a chat completion request in seconds
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_seconds: u64,
}

impl ProviderConfig {
    /// Get the provider API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn default_models_url() -> String {
    "https://api.groq.com/openai/v1/models".to_string()
}

fn default_chat_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_catalog_timeout() -> u64 {
    20
}

fn default_chat_timeout() -> u64 {
    30
}

/// Chat behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// System prompt prepended to every user message
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Optional chat identifier allow-list (single value). Empty or absent
    /// means every inbound chat is accepted.
    #[serde(default)]
    allowed_chat: Option<String>,
    /// Reply character budget applied at the message boundary
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
}

impl ChatConfig {
    /// Get the configured allow-list entry, treating an empty string as unset
    pub fn allowed_chat(&self) -> Option<&str> {
        self.allowed_chat.as_deref().filter(|c| !c.is_empty())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            allowed_chat: None,
            max_reply_chars: default_max_reply_chars(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

fn default_system_prompt() -> String {
    "You are a friendly assistant. Answer clearly and practically, concise \
     but complete. Offer concrete steps or suggestions where useful."
        .to_string()
}

fn default_max_reply_chars() -> usize {
    3500
}

fn default_temperature() -> f64 {
    0.6
}

fn default_top_p() -> f64 {
    0.9
}

/// Model selection policy configuration
///
/// Both lists are matched as case-insensitive literal substrings against
/// catalog model ids. Order matters for `priority` (first keyword wins).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            blacklist: default_blacklist(),
        }
    }
}

fn default_priority() -> Vec<String> {
    ["llama-4", "llama-3", "mistral", "gemma", "openchat", "chat"]
        .map(String::from)
        .to_vec()
}

fn default_blacklist() -> Vec<String> {
    [
        "embed",
        "embedding",
        "vision",
        "whisper",
        "tts",
        "audio",
        "moderation",
    ]
    .map(String::from)
    .to_vec()
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Upper bound for provider timeouts in seconds
const MAX_TIMEOUT_SECONDS: u64 = 300;

impl Config {
    /// Load configuration from a TOML file, apply environment overrides, and
    /// validate.
    ///
    /// A missing or empty API key (after the `CHATRELAY_API_KEY` override) is
    /// a hard error: it is the one condition that must halt the process
    /// before serving any request.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Replace the file-sourced API key with `CHATRELAY_API_KEY` if set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                self.provider.api_key = key;
            }
        }
    }

    /// Validate invariants not expressible through serde defaults
    pub fn validate(&self) -> AppResult<()> {
        if self.provider.api_key.trim().is_empty() {
            return Err(AppError::Config(format!(
                "provider.api_key is required (set it in the config file or via {})",
                API_KEY_ENV
            )));
        }
        for (name, url) in [
            ("provider.models_url", &self.provider.models_url),
            ("provider.chat_url", &self.provider.chat_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }
        for (name, secs) in [
            (
                "provider.catalog_timeout_seconds",
                self.provider.catalog_timeout_seconds,
            ),
            (
                "provider.chat_timeout_seconds",
                self.provider.chat_timeout_seconds,
            ),
        ] {
            if secs == 0 || secs > MAX_TIMEOUT_SECONDS {
                return Err(AppError::Config(format!(
                    "{} must be in range (0, {}], got {}",
                    name, MAX_TIMEOUT_SECONDS, secs
                )));
            }
        }
        if self.chat.max_reply_chars == 0 {
            return Err(AppError::Config(
                "chat.max_reply_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Mask a secret for logging, keeping only a short prefix
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let prefix: String = secret.chars().take(6).collect();
    format!("{}...", prefix)
}
