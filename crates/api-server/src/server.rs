//! API server — serves the webhook endpoint and the metrics exporter.

use crate::rest::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use relay_conversions::{ConversionsClient, PurchaseEventMapper};
use relay_core::config::AppConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Main API server.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig, client: Arc<dyn ConversionsClient>) -> Self {
        let state = AppState {
            mapper: Arc::new(PurchaseEventMapper::new(&config.mapping)),
            client,
            signature_secret: config
                .webhook
                .signature_secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Arc::from),
            node_id: config.node_id.clone(),
            start_time: Instant::now(),
        };
        Self { config, state }
    }

    /// Build the HTTP router.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config.webhook.path)
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(
            addr = %addr,
            webhook_path = %self.config.webhook.path,
            signature_check = self.state.signature_secret.is_some(),
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }

    /// Start the Prometheus exporter on a separate port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

pub fn build_router(state: AppState, webhook_path: &str) -> Router {
    Router::new()
        // Saleor webhook
        .route(webhook_path, post(rest::handle_order_confirmed))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
