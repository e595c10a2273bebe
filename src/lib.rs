//! Chatrelay - chat relay with resilient model selection
//!
//! Receives user messages over a thin HTTP boundary, forwards them to an
//! OpenAI-compatible LLM provider, and returns the model's reply. The core
//! keeps a cached "best" model chosen from the provider's catalog and
//! transparently recovers when the cached choice is decommissioned upstream.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod provider;
pub mod telemetry;
