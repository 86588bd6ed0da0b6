use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use chat_relay::config::Config;
use chat_relay::llm::OpenAICompatibleProvider;
use chat_relay::{AppState, build_app};

#[derive(Parser, Debug)]
#[command(name = "chat-relay", version, about = "Relay chat messages to OpenAI")]
struct Args {
    /// Path to the YAML config file. Missing file means defaults.
    #[arg(short, long, default_value = "chat-relay.yaml")]
    config: PathBuf,

    /// Host to bind, overrides the config file.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides the config file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,chat_relay=debug")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .await
        .with_context(|| format!("loading {}", args.config.display()))?
        .with_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.provider.api_key().is_none() {
        warn!("OPENAI_API_KEY is not set; /chat will answer with a configuration error");
    }

    let provider = OpenAICompatibleProvider::new(
        reqwest::Client::new(),
        config.provider.base_url.clone(),
        config.provider.api_key.clone(),
    );
    info!(base_url = %config.provider.base_url, "configured OpenAI provider");

    let state = AppState::new(Arc::new(provider), config.provider);
    let app = build_app(state, config.server.request_timeout_seconds);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server running on http://localhost:{}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
