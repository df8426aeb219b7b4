pub mod aggregate;
pub mod api;
pub mod cache;
pub mod gateway;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod series;
pub mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use common::Result;
use common::config::Settings;
use services::DashboardService;
use tokio::net::TcpListener;
use tracing::info;

/// Loads configuration, resolves the dataset dates once, and serves the
/// dashboard API.
pub async fn run_dashboard_server(config_path: &str) -> Result<()> {
    // Load configuration
    let config = Settings::new(config_path)?;

    // Initialize dashboard service (resolves the last date column once)
    let service = Arc::new(DashboardService::new(&config).await?);

    let status = service.status();
    info!(last_updated = %status.last_updated, stale = status.stale, "Dashboard data ready");

    // Create API router
    let api_router = api::routes(Arc::clone(&service));

    // Start the server
    let addr = SocketAddr::from(([127, 0, 0, 1], config.api_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Dashboard API server listening on {}", addr);
    axum::serve(listener, api_router).await?;

    Ok(())
}
