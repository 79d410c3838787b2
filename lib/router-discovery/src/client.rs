//! HTTP client for the registry API

use crate::{DiscoveryError, Result};
use reqwest::StatusCode;
use router_api::v1::{REGISTER_PATH, SERVICES_PATH};
use router_api::{RegisterRequest, ServiceInstance};
use std::time::Duration;
use tracing::debug;

/// Default bound on a single registry call
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// DiscoveryClient talks to the registry's HTTP API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DiscoveryClient {
    /// Create a client for the registry at `base_url`, e.g. `http://127.0.0.1:8000`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register (or refresh) an instance
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let url = format!("{}{}", self.base_url, REGISTER_PATH);
        let response = self.http.post(&url).json(request).send().await?;

        match response.status() {
            status if status.is_success() => {
                debug!(
                    "Registered {} at {}:{} with {}",
                    request.name, request.host, request.port, self.base_url
                );
                Ok(())
            }
            status => Err(DiscoveryError::UnexpectedStatus(status.as_u16())),
        }
    }

    /// Get the alive instances of a service
    pub async fn lookup(&self, name: &str) -> Result<Vec<ServiceInstance>> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            SERVICES_PATH,
            urlencoding::encode(name)
        );
        let response = self.http.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let instances: Vec<ServiceInstance> = response.json().await?;
                debug!("Discovered {} instances of {}", instances.len(), name);
                Ok(instances)
            }
            StatusCode::NOT_FOUND => Err(DiscoveryError::NotFound(name.to_string())),
            StatusCode::SERVICE_UNAVAILABLE => Err(DiscoveryError::Unavailable(name.to_string())),
            status => Err(DiscoveryError::UnexpectedStatus(status.as_u16())),
        }
    }
}
