//! API server — HTTP router, middleware, and the metrics exporter.

use crate::rest::{self, AppState};
use axum::routing::{delete, get, post};
use axum::Router;
use revoa_core::config::AppConfig;
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Main API server for the merchant dashboard backend.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start the HTTP REST server. Blocks until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = Router::new()
            // Insight generation
            .route("/v1/insights/analyze", post(rest::handle_analyze))
            .route("/v1/insights/proactive", post(rest::handle_proactive))
            .route("/v1/insights/scan", post(rest::handle_scan))
            // Suggestion feed
            .route("/v1/suggestions", get(rest::handle_suggestions))
            .route(
                "/v1/suggestions/:id",
                delete(rest::handle_dismiss_suggestion),
            )
            // Automation rules
            .route(
                "/v1/entities/:entity_id/automations",
                post(rest::handle_adopt_rule),
            )
            .route("/v1/automations", get(rest::handle_list_rules))
            .route(
                "/v1/automations/:id/approve",
                post(rest::handle_approve_rule),
            )
            .route("/v1/automations/evaluate", post(rest::handle_evaluate_rules))
            // Reporting
            .route("/v1/overview", get(rest::handle_overview))
            .route("/v1/sync/:platform", post(rest::handle_sync))
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus exporter on its own port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install_recorder()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");

        // Keep the handle alive
        std::mem::forget(handle);
        Ok(())
    }
}
