//! Integration tests for stale-model recovery
//!
//! When the provider rejects the cached model with a 400 carrying a
//! decommission signal, the invoker must force one cache refresh and retry
//! the completion exactly once. A second identical failure is terminal - no
//! third attempt, ever.

use chatrelay::config::Config;
use chatrelay::handlers::AppState;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_state(server: &MockServer) -> AppState {
    let toml = format!(
        r#"
[server]
host = "127.0.0.1"
port = 8080

[provider]
api_key = "gsk_test_key"
models_url = "{uri}/v1/models"
chat_url = "{uri}/v1/chat/completions"
"#,
        uri = server.uri()
    );
    let config: Config = toml::from_str(&toml).expect("should parse test config");
    AppState::new(Arc::new(config)).expect("should create AppState")
}

fn listing(ids: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "data": ids.iter().map(|id| serde_json::json!({"id": id})).collect::<Vec<_>>()
    })
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

fn stale_400() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "error": {"message": "The model `llama-old` has been decommissioned"}
    }))
}

#[tokio::test]
async fn test_stale_model_triggers_one_refresh_and_one_retry() {
    let server = MockServer::start().await;

    // First catalog snapshot offers the soon-to-be-stale model, the refresh
    // after the 400 offers its replacement. Mount order matters: the
    // one-shot mock is consulted first.
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["llama-old"])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["llama-new"])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "llama-old"})))
        .respond_with(stale_400())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "llama-new"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("all good now")))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server);
    let reply = state.invoker().send("hello").await;

    assert_eq!(reply, "all good now");
    assert_eq!(state.cache().get().await, Some("llama-new".to_string()));
}

#[tokio::test]
async fn test_second_stale_failure_is_terminal_not_a_loop() {
    let server = MockServer::start().await;

    // The refresh keeps returning the same dead model, so the retry hits the
    // same 400. Exactly two completion calls: original plus one retry.
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["llama-old"])))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(stale_400())
        .expect(2)
        .mount(&server)
        .await;

    let state = test_state(&server);
    let reply = state.invoker().send("hello").await;

    assert_eq!(
        reply,
        "Unexpected provider error 400: The model `llama-old` has been decommissioned"
    );
}

#[tokio::test]
async fn test_refresh_finding_no_model_ends_the_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["llama-old"])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[])))
        .mount(&server)
        .await;

    // Only the first completion call happens; after the refresh comes back
    // empty there is no model left to retry with.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(stale_400())
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server);
    let reply = state.invoker().send("hello").await;

    assert_eq!(reply, "No AI model is currently available.");
}

#[tokio::test]
async fn test_non_stale_400_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["llama-3-70b"])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"message": "context length exceeded"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server);
    let reply = state.invoker().send("hello").await;

    assert_eq!(
        reply,
        "Unexpected provider error 400: context length exceeded"
    );
}
