use anyhow::{Context, Result};
use router_core::serve;
use router_discovery::DiscoveryClient;
use router_proxy::{
    Gateway, LoggingMiddleware, MetricsCollector, MetricsMiddleware, MiddlewareChain,
    RequestForwarder, RouteTable,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::GatewayConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting router-gateway...");

    let config = GatewayConfig::from_env()?;

    let routes = match &config.routes_file {
        Some(path) => RouteTable::from_yaml_file(path)
            .with_context(|| format!("failed to load routes from {}", path.display()))?,
        None => RouteTable::default(),
    };
    info!("Route table initialized with {} routes", routes.len());

    let discovery = DiscoveryClient::new(config.discovery_url.clone(), config.discovery_timeout)?;
    info!(
        "Discovery client initialized for {} ({:?} timeout)",
        discovery.base_url(),
        config.discovery_timeout
    );

    let forwarder = RequestForwarder::new(config.backend_timeout);
    info!("Request forwarder initialized with {:?} timeout", config.backend_timeout);

    let metrics_collector = MetricsCollector::new()?;
    let middleware = MiddlewareChain::new()
        .add(LoggingMiddleware)
        .add(MetricsMiddleware::new(metrics_collector.clone()));
    info!("Middleware chain initialized with logging and metrics");

    let gateway = Gateway::new(discovery, routes, config.strategy.selector(), forwarder)
        .with_middleware(middleware)
        .with_metrics(metrics_collector);
    info!("Gateway initialized with {:?} load balancing", config.strategy);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("HTTP server listening on {}", config.listen_addr);

    tokio::select! {
        result = serve(listener, Arc::new(gateway)) => result?,
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
