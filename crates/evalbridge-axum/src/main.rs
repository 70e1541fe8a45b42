//! `evalbridge` entry point - the composition root.

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use evalbridge_axum::bootstrap::spawn_signal_listener;
use evalbridge_axum::{Cli, start_server};
use evalbridge_core::BridgeConfig;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = BridgeConfig::from_env().context("invalid configuration")?;

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    start_server(config, cli.server_config(), cancel).await
}
