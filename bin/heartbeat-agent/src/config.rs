//! Heartbeat agent configuration from the environment

use anyhow::{Context, Result};
use router_api::RegisterRequest;
use router_discovery::{DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_HEARTBEAT_INTERVAL};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// SERVICE_NAME, SERVICE_HOST, SERVICE_PORT
    pub registration: RegisterRequest,
    /// DISCOVERY_URL
    pub discovery_url: String,
    /// HEARTBEAT_INTERVAL_SECS
    pub interval: Duration,
    pub timeout: Duration,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let name = lookup("SERVICE_NAME").context("SERVICE_NAME is required")?;
        let host = lookup("SERVICE_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("SERVICE_PORT").context("SERVICE_PORT is required")?;
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid SERVICE_PORT: {}", port))?;

        let interval = match lookup("HEARTBEAT_INTERVAL_SECS") {
            Some(secs) => {
                let secs: u64 = secs
                    .parse()
                    .with_context(|| format!("invalid HEARTBEAT_INTERVAL_SECS: {}", secs))?;
                anyhow::ensure!(secs > 0, "HEARTBEAT_INTERVAL_SECS must be positive");
                Duration::from_secs(secs)
            }
            None => DEFAULT_HEARTBEAT_INTERVAL,
        };

        Ok(Self {
            registration: RegisterRequest::new(name, host, port),
            discovery_url: lookup("DISCOVERY_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8000".to_string()),
            interval,
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
        })
    }
}
