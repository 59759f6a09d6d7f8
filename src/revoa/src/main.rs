//! Revoa — merchant ad-operations backend.
//!
//! Main entry point that wires the tracker, suggestion generators,
//! automation engine, and sync service behind the REST API.

use clap::Parser;
use revoa_api::{ApiServer, AppState, SuggestionFeed};
use revoa_automation::AutomationEngine;
use revoa_core::config::AppConfig;
use revoa_reporting::PerformanceTracker;
use revoa_sync::{ConnectorConfig, SyncService};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "revoa")]
#[command(about = "Merchant ad-operations backend")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "REVOA__NODE_ID")]
    node_id: Option<String>,

    /// Ad account to track (overrides config)
    #[arg(long, env = "REVOA__ACCOUNT_ID")]
    account_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "REVOA__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Skip the background sync loop (API-only mode)
    #[arg(long, default_value_t = false)]
    api_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revoa=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Revoa starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(account_id) = cli.account_id {
        config.account_id = account_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        node_id = %config.node_id,
        account_id = %config.account_id,
        http_port = config.api.http_port,
        sync_enabled = config.sync.enabled,
        "Configuration loaded"
    );

    // Shared engines
    let tracker = Arc::new(PerformanceTracker::new());
    let automations = Arc::new(AutomationEngine::new());
    let feed = Arc::new(SuggestionFeed::new());
    let sync = Arc::new(SyncService::new(
        tracker.clone(),
        ConnectorConfig {
            page_size: config.sync.page_size,
            ..ConnectorConfig::default()
        },
    ));

    // Background sync loop: pull every platform, then give the automation
    // engine a pass over the refreshed metrics.
    if config.sync.enabled && !cli.api_only {
        let sync_for_loop = sync.clone();
        let tracker_for_loop = tracker.clone();
        let automations_for_loop = automations.clone();
        let feed_for_loop = feed.clone();
        let account_id = config.account_id.clone();
        let interval_secs = config.sync.interval_secs;

        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                for result in sync_for_loop.sync_all(&account_id) {
                    match result {
                        Ok(report) => info!(
                            platform = ?report.platform,
                            processed = report.records_processed,
                            failed = report.records_failed,
                            "Scheduled sync completed"
                        ),
                        Err(e) => error!(error = %e, "Scheduled sync failed"),
                    }
                }

                let mut triggered = 0usize;
                for metrics in tracker_for_loop.all_metrics() {
                    triggered += automations_for_loop.evaluate(&metrics).len();
                }
                if triggered > 0 {
                    info!(triggered, "Automation rules fired during sync pass");
                }

                let generated = feed_for_loop.refresh_from(&tracker_for_loop).len();
                if generated > 0 {
                    info!(generated, "Suggestions refreshed from tracked metrics");
                }
            }
        });
    } else {
        info!("Running in API-only mode (no background sync)");
    }

    let state = AppState {
        tracker,
        automations,
        sync,
        feed,
        account_id: config.account_id.clone(),
        node_id: config.node_id.clone(),
        start_time: Instant::now(),
    };

    let api_server = ApiServer::new(config, state);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Revoa is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
