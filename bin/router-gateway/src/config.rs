//! Gateway configuration from the environment

use anyhow::{Context, Result};
use router_discovery::DEFAULT_DISCOVERY_TIMEOUT;
use router_proxy::{LoadBalancingStrategy, DEFAULT_BACKEND_TIMEOUT};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct GatewayConfig {
    /// GATEWAY_LISTEN_ADDR
    pub listen_addr: SocketAddr,
    /// DISCOVERY_URL
    pub discovery_url: String,
    /// GATEWAY_ROUTES_FILE; the built-in table is used when unset
    pub routes_file: Option<PathBuf>,
    /// GATEWAY_LB_STRATEGY
    pub strategy: LoadBalancingStrategy,
    /// GATEWAY_DISCOVERY_TIMEOUT_SECS
    pub discovery_timeout: Duration,
    /// GATEWAY_BACKEND_TIMEOUT_SECS
    pub backend_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([127, 0, 0, 1], 8080).into(),
            discovery_url: "http://127.0.0.1:8000".to_string(),
            routes_file: None,
            strategy: LoadBalancingStrategy::Random,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("GATEWAY_LISTEN_ADDR") {
            config.listen_addr = addr
                .parse()
                .with_context(|| format!("invalid GATEWAY_LISTEN_ADDR: {}", addr))?;
        }
        if let Some(url) = lookup("DISCOVERY_URL") {
            config.discovery_url = url;
        }
        if let Some(path) = lookup("GATEWAY_ROUTES_FILE") {
            config.routes_file = Some(PathBuf::from(path));
        }
        if let Some(strategy) = lookup("GATEWAY_LB_STRATEGY") {
            config.strategy = strategy
                .parse()
                .map_err(anyhow::Error::msg)
                .context("invalid GATEWAY_LB_STRATEGY")?;
        }
        if let Some(secs) = lookup("GATEWAY_DISCOVERY_TIMEOUT_SECS") {
            config.discovery_timeout = parse_secs("GATEWAY_DISCOVERY_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("GATEWAY_BACKEND_TIMEOUT_SECS") {
            config.backend_timeout = parse_secs("GATEWAY_BACKEND_TIMEOUT_SECS", &secs)?;
        }

        Ok(config)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    let secs: u64 = value
        .parse()
        .with_context(|| format!("invalid {}: {}", key, value))?;
    anyhow::ensure!(secs > 0, "{} must be positive", key);
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.discovery_url, "http://127.0.0.1:8000");
        assert_eq!(config.routes_file, None);
        assert_eq!(config.strategy, LoadBalancingStrategy::Random);
        assert_eq!(config.backend_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("DISCOVERY_URL", "http://registry:8000"),
            ("GATEWAY_ROUTES_FILE", "/etc/gateway/routes.yaml"),
            ("GATEWAY_LB_STRATEGY", "round-robin"),
            ("GATEWAY_BACKEND_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.discovery_url, "http://registry:8000");
        assert_eq!(config.routes_file, Some(PathBuf::from("/etc/gateway/routes.yaml")));
        assert_eq!(config.strategy, LoadBalancingStrategy::RoundRobin);
        assert_eq!(config.backend_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values() {
        assert!(GatewayConfig::from_lookup(lookup(&[("GATEWAY_LB_STRATEGY", "sticky")])).is_err());
        assert!(GatewayConfig::from_lookup(lookup(&[("GATEWAY_LISTEN_ADDR", "nowhere")])).is_err());
        assert!(
            GatewayConfig::from_lookup(lookup(&[("GATEWAY_DISCOVERY_TIMEOUT_SECS", "-1")])).is_err()
        );
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        for key in ["GATEWAY_DISCOVERY_TIMEOUT_SECS", "GATEWAY_BACKEND_TIMEOUT_SECS"] {
            let err = GatewayConfig::from_lookup(lookup(&[(key, "0")])).unwrap_err();
            assert_eq!(err.to_string(), format!("{} must be positive", key));
        }
    }
}
