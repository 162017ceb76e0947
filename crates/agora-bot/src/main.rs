//! # agora-bot
//!
//! Deliberation-chat server binary — loads credentials, wires the Gemini and
//! backend clients into the chat server, and runs until ctrl-c.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use agora_backend::BackendClient;
use agora_llm::GeminiClient;
use agora_server::config::{Credentials, ServerConfig};
use agora_server::server::ChatServer;

/// Deliberation-chat bot server.
#[derive(Parser, Debug)]
#[command(name = "agora-bot", about = "Deliberation-chat bot server")]
struct Cli {
    /// Host to bind (overrides `AGORA_HOST`).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides `AGORA_PORT`; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,
}

impl Cli {
    /// Env-derived config with CLI flags applied on top.
    fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::from_env();
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Cli::parse();
    let config = args.server_config();

    let credentials = Credentials::from_env().context("startup credentials incomplete")?;
    let llm = Arc::new(GeminiClient::new(
        credentials.gemini_api_key,
        credentials.gemini_model,
    ));
    let backend = Arc::new(BackendClient::new(
        credentials.backend_base_url,
        credentials.backend_api_key,
    ));

    let server = ChatServer::new(config, llm, backend);
    let shutdown = Arc::clone(server.shutdown());
    let handle = tokio::spawn(server.listen());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    tracing::info!("shutting down");
    shutdown.shutdown();
    handle
        .await
        .context("server task panicked")?
        .context("server terminated with error")?;

    tracing::info!("shutdown complete");
    Ok(())
}
