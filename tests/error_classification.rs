//! Integration tests for terminal provider failures
//!
//! Every non-recoverable classification must produce its fixed user-facing
//! string from exactly one completion attempt - no automatic retries.

use chatrelay::config::Config;
use chatrelay::handlers::AppState;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_state(models_url: &str, chat_url: &str) -> AppState {
    let toml = format!(
        r#"
[server]
host = "127.0.0.1"
port = 8080

[provider]
api_key = "gsk_test_key"
models_url = "{models_url}"
chat_url = "{chat_url}"
"#
    );
    let config: Config = toml::from_str(&toml).expect("should parse test config");
    AppState::new(Arc::new(config)).expect("should create AppState")
}

async fn server_with_catalog() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": "llama-3.3-70b"}]
        })))
        .mount(&server)
        .await;
    server
}

fn chat_mock(status: u16, body: serde_json::Value) -> Mock {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
}

fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({"error": {"message": message}})
}

#[tokio::test]
async fn test_rate_limit_is_terminal_with_single_call() {
    let server = server_with_catalog().await;
    chat_mock(429, error_body("rate limit reached"))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(
        &format!("{}/v1/models", server.uri()),
        &format!("{}/v1/chat/completions", server.uri()),
    );
    let reply = state.invoker().send("hello").await;

    assert_eq!(reply, "Rate limit exceeded. Please try again later.");
}

#[tokio::test]
async fn test_401_reports_bad_credentials() {
    let server = server_with_catalog().await;
    chat_mock(401, error_body("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(
        &format!("{}/v1/models", server.uri()),
        &format!("{}/v1/chat/completions", server.uri()),
    );
    assert_eq!(
        state.invoker().send("hello").await,
        "API key is invalid or expired."
    );
}

#[tokio::test]
async fn test_403_reports_forbidden() {
    let server = server_with_catalog().await;
    chat_mock(403, error_body("model access denied"))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(
        &format!("{}/v1/models", server.uri()),
        &format!("{}/v1/chat/completions", server.uri()),
    );
    assert_eq!(
        state.invoker().send("hello").await,
        "Access to the model is forbidden."
    );
}

#[tokio::test]
async fn test_5xx_reports_upstream_trouble() {
    let server = server_with_catalog().await;
    chat_mock(503, error_body("service unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(
        &format!("{}/v1/models", server.uri()),
        &format!("{}/v1/chat/completions", server.uri()),
    );
    assert_eq!(
        state.invoker().send("hello").await,
        "The AI provider is having trouble. Please try again later."
    );
}

#[tokio::test]
async fn test_success_body_without_choices_is_a_parse_error() {
    let server = server_with_catalog().await;
    chat_mock(200, serde_json::json!({"choices": []}))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(
        &format!("{}/v1/models", server.uri()),
        &format!("{}/v1/chat/completions", server.uri()),
    );
    let reply = state.invoker().send("hello").await;
    assert!(
        reply.starts_with("Could not parse the AI response"),
        "got: {reply}"
    );
}

#[tokio::test]
async fn test_unreachable_completion_endpoint_reports_connect_failure() {
    let server = server_with_catalog().await;

    // Catalog works, completions point at a port nobody listens on.
    let state = test_state(
        &format!("{}/v1/models", server.uri()),
        "http://127.0.0.1:9/v1/chat/completions",
    );
    let reply = state.invoker().send("hello").await;
    assert!(
        reply.starts_with("Cannot connect to the AI provider"),
        "got: {reply}"
    );
}

#[tokio::test]
async fn test_empty_catalog_means_no_completion_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Zero completion requests allowed.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = test_state(
        &format!("{}/v1/models", server.uri()),
        &format!("{}/v1/chat/completions", server.uri()),
    );
    assert_eq!(
        state.invoker().send("hello").await,
        "No AI model is currently available."
    );
}
