//! Registry configuration from the environment

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct RegistryConfig {
    /// REGISTRY_LISTEN_ADDR
    pub listen_addr: SocketAddr,
    /// REGISTRY_TTL_SECS
    pub ttl: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([127, 0, 0, 1], 8000).into(),
            ttl: router_core::DEFAULT_TTL,
        }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("REGISTRY_LISTEN_ADDR") {
            config.listen_addr = addr
                .parse()
                .with_context(|| format!("invalid REGISTRY_LISTEN_ADDR: {}", addr))?;
        }
        if let Some(ttl) = lookup("REGISTRY_TTL_SECS") {
            let secs: u64 = ttl
                .parse()
                .with_context(|| format!("invalid REGISTRY_TTL_SECS: {}", ttl))?;
            anyhow::ensure!(secs > 0, "REGISTRY_TTL_SECS must be positive");
            config.ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
