use anyhow::Result;
use router_discovery::{DiscoveryClient, Heartbeat};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::AgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting heartbeat-agent...");

    let config = AgentConfig::from_env()?;
    let client = DiscoveryClient::new(config.discovery_url.clone(), config.timeout)?;
    let heartbeat = Heartbeat::start(client, config.registration.clone(), config.interval);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping heartbeat...");

    let (successes, failures) = (heartbeat.stats().successes(), heartbeat.stats().failures());
    heartbeat.stop().await;
    info!(
        "Heartbeat for {} stopped after {} successful and {} failed registrations",
        config.registration.name, successes, failures
    );

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
