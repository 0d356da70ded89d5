//! Ratekeeper Server Binary
//!
//! Serves exchange-rate lookups and writes over HTTP.

use std::net::{IpAddr, SocketAddr};

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratekeeper_server::{ApiServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Ratekeeper");

    // Load configuration
    let config = ServerConfig::from_env()?;
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let ip: IpAddr = config
        .listen_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", config.listen_addr, e))?;

    info!(
        cache_ttl_ms = config.cache_ttl_ms,
        caching = config.rate_service_config().cache.is_enabled(),
        postgres = config.database_url.is_some(),
        "Configuration loaded"
    );

    let server = ApiServer::from_config(&config).await?;
    server.run(SocketAddr::new(ip, config.listen_port)).await?;

    info!("Ratekeeper shutdown complete");
    Ok(())
}
