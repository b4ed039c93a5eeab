use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use zone_control::config::ServerConfig;
use zone_control::metrics::Metrics;
use zone_control::net::server::ScoringServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging, RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Zone Control Scoring Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServerConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: {}:{}, default_decay_rate={}, max_body_bytes={}",
        config.bind_address, config.port, config.default_decay_rate, config.max_body_bytes
    );

    let metrics = Arc::new(Metrics::new());
    let server = ScoringServer::new(config, metrics.clone());

    // Shutdown signal handler
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received");
    };

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    info!(
        "Server stopped after {}s ({} score, {} status requests)",
        metrics.uptime_seconds(),
        metrics.score_requests.load(std::sync::atomic::Ordering::Relaxed),
        metrics.status_requests.load(std::sync::atomic::Ordering::Relaxed)
    );

    Ok(())
}
