//! Gateway binary.
//!
//! Reads the route table from `ARENA_SERVICES` (and the bind address
//! from `ARENA_GATEWAY_ADDR`), then serves the proxy until terminated.

use arena_gateway::{Gateway, GatewayConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = GatewayConfig::from_env()?;
    info!(services = config.routes.len(), "arena-gateway starting");

    let gateway = Gateway::bind(config).await?;
    gateway.run().await?;
    Ok(())
}
