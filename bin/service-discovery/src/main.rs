use anyhow::Result;
use router_core::{serve, RegistryApi, ServiceRegistry, SystemClock};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::RegistryConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting service-discovery registry...");

    let config = RegistryConfig::from_env()?;

    let registry = Arc::new(ServiceRegistry::with_clock(config.ttl, Arc::new(SystemClock)));
    info!("Service registry initialized (TTL {:?})", registry.ttl());

    let api = Arc::new(RegistryApi::new(registry));

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("Registry listening on {}", config.listen_addr);

    tokio::select! {
        result = serve(listener, api) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, exiting...");
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
