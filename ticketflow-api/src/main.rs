//! Ticketflow - Main Application Entry Point
//!
//! Runs the workflow automation engine with its management API.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use ticketflow_api::AppState;
use ticketflow_executor::InMemoryTicketHub;
use ticketflow_orchestrator::OrchestratorConfig;
use ticketflow_storage::InMemoryRuleStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,ticketflow=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .context("PORT must be a valid u16")?;

    let scan_interval = std::env::var("SCAN_INTERVAL_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse::<u64>()
        .context("SCAN_INTERVAL_SECS must be a number of seconds")?;
    let action_timeout = std::env::var("ACTION_TIMEOUT_MS")
        .unwrap_or_else(|_| "5000".to_string())
        .parse::<u64>()
        .context("ACTION_TIMEOUT_MS must be a number of milliseconds")?;

    let config = OrchestratorConfig {
        scan_interval: Duration::from_secs(scan_interval),
        action_timeout: Duration::from_millis(action_timeout),
        ..OrchestratorConfig::default()
    };

    tracing::info!("Initializing in-memory backends...");
    let rules = Arc::new(InMemoryRuleStore::new());
    let hub = Arc::new(InMemoryTicketHub::new());

    // Create shared application state and start the engine
    let app_state = AppState::with_backends(rules, hub.clone(), hub, config);
    app_state.start_engine();

    tracing::info!("Starting Ticketflow automation server on {}:{}", host, port);

    // Build our application with routes
    let app = ticketflow_api::create_router(app_state);

    // Run it
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
