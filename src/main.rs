//! Chatrelay HTTP server
//!
//! Starts an Axum web server that relays inbound messages to the configured
//! LLM provider using a cached, self-healing model selection.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use chatrelay::cli::{Cli, Command, generate_config_template};
use chatrelay::config::{Config, mask};
use chatrelay::handlers::{AppState, router};
use chatrelay::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                println!("Wrote configuration template to {path}");
            }
            None => print!("{template}"),
        }
        return Ok(());
    }

    // Load configuration; a missing API key halts here, before serving.
    let config = Arc::new(Config::from_file(&cli.config)?);

    telemetry::init(&config.observability.log_level);

    tracing::info!(
        api_key = %mask(config.provider.api_key()),
        allowed_chat = config.chat.allowed_chat().unwrap_or("unrestricted"),
        "Starting chatrelay server on {}:{}",
        config.server.host,
        config.server.port
    );

    let state = AppState::new(config.clone())?;

    // Warm the model cache so the first message doesn't pay for selection.
    match state.cache().ensure(true).await {
        Some(model) => tracing::info!(model = %model, "initial model selected"),
        None => tracing::warn!("no model selected at startup, will retry on first message"),
    }

    let app = router(state);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0])),
        config.server.port,
    ));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
