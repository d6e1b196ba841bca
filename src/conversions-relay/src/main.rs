//! Conversions Relay — forwards Saleor order confirmations to the Meta
//! Conversions API as server-side purchase events.
//!
//! Main entry point that loads configuration and starts the server.

use anyhow::Context;
use clap::Parser;
use relay_api::ApiServer;
use relay_conversions::GraphApiClient;
use relay_core::config::AppConfig;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "conversions-relay")]
#[command(about = "Forwards confirmed orders to the Meta Conversions API")]
#[command(version)]
struct Cli {
    /// Optional TOML config file (environment variables take precedence)
    #[arg(long, short)]
    config: Option<String>,

    /// Node identifier (overrides config)
    #[arg(long, env = "CONVERSIONS_RELAY__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CONVERSIONS_RELAY__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Disable the Prometheus exporter
    #[arg(long, default_value_t = false)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "conversions_relay=info,relay_api=info,relay_conversions=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Conversions relay starting up");

    // Load configuration
    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => {
            return Err(e).context("failed to load config file");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    };

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if cli.no_metrics {
        config.metrics.enabled = false;
    }

    config.validate()?;

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        pixel_id = %config.conversions.pixel_id,
        currency = %config.mapping.currency,
        event_id_strategy = ?config.mapping.event_id_strategy,
        "Configuration loaded"
    );

    let client = GraphApiClient::new(config.conversions.clone())?;
    let api_server = ApiServer::new(config.clone(), Arc::new(client));

    if config.metrics.enabled {
        if let Err(e) = api_server.start_metrics() {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Conversions relay is ready to receive webhooks");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    info!("Conversions relay stopped");
    Ok(())
}
