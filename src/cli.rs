//! Command-line interface for chatrelay
//!
//! Provides argument parsing and subcommand handling for the chatrelay binary.

use clap::{Parser, Subcommand};

/// Chat relay with resilient model selection
#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(version)]
#[command(about = "Chat relay with resilient model selection for OpenAI-compatible providers")]
#[command(
    long_about = "Chatrelay forwards user messages to an OpenAI-compatible LLM provider, \
    keeping a cached selection of the best available model and transparently \
    reselecting when the provider decommissions it."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Chatrelay Configuration
# =======================
#
# This file configures the HTTP boundary, the LLM provider endpoints, the
# chat behavior, and the model selection policy.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# ─────────────────────────────────────────────────────────────────────────────
# PROVIDER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[provider]
# API key for the provider. Required. The CHATRELAY_API_KEY environment
# variable overrides this value, so the key can stay out of the file.
api_key = ""

# Model listing and chat completion endpoints (OpenAI-compatible)
models_url = "https://api.groq.com/openai/v1/models"
chat_url = "https://api.groq.com/openai/v1/chat/completions"

# Request timeouts in seconds
catalog_timeout_seconds = 20
chat_timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# CHAT BEHAVIOR
# ─────────────────────────────────────────────────────────────────────────────

[chat]
# System prompt prepended to every user message
system_prompt = "You are a friendly assistant. Answer clearly and practically, concise but complete. Offer concrete steps or suggestions where useful."

# Only respond to this chat identifier. Empty or absent = respond to all chats.
# allowed_chat = "-100123456789"

# Replies longer than this many characters are truncated with a marker
max_reply_chars = 3500

# Sampling parameters forwarded to the provider
temperature = 0.6
top_p = 0.9

# ─────────────────────────────────────────────────────────────────────────────
# MODEL SELECTION POLICY
# ─────────────────────────────────────────────────────────────────────────────
#
# Both lists are case-insensitive literal substrings matched against catalog
# model ids. Priority order matters: the first keyword matching any model
# wins. Blacklisted models are skipped unless that would leave no candidates.

[selection]
priority = ["llama-4", "llama-3", "mistral", "gemma", "openchat", "chat"]
blacklist = ["embed", "embedding", "vision", "whisper", "tts", "audio", "moderation"]

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides)
log_level = "info"
"#
}
