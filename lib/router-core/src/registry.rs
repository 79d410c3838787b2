//! Service registry mapping service names to their instances

use crate::{Clock, CoreError, Result, SystemClock};
use chrono::{DateTime, Utc};
use router_api::{RegisterRequest, ServiceInstance, ServiceSummary};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Heartbeat age after which an instance stops being returned by lookups
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// ServiceRegistry maintains the known instances of every service.
///
/// Entries are never removed. A stale instance stays stored and is simply
/// filtered out of lookups until it registers again.
pub struct ServiceRegistry {
    // Map of service name to instances, unique by (host, port)
    services: Arc<RwLock<HashMap<String, Vec<ServiceInstance>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_TTL, Arc::new(SystemClock))
    }

    /// Create a registry with a custom TTL and time source
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            services: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register or refresh an instance.
    ///
    /// Any entry with the same `(host, port)` under the name is replaced, so
    /// repeated registrations never produce duplicates.
    pub async fn register(&self, request: RegisterRequest) -> ServiceInstance {
        let now = self.clock.now();

        let mut services = self.services.write().await;
        let instances = services.entry(request.name.clone()).or_default();

        // Heartbeats never move backwards, even if the wall clock does
        let mut last_heartbeat = now;
        if let Some(pos) = instances
            .iter()
            .position(|i| i.same_address(&request.host, request.port))
        {
            let previous = instances.remove(pos);
            last_heartbeat = last_heartbeat.max(previous.last_heartbeat);
        }

        let instance = ServiceInstance {
            name: request.name,
            host: request.host,
            port: request.port,
            last_heartbeat,
        };
        instances.push(instance.clone());

        debug!(
            "Registered {} at {}:{}",
            instance.name, instance.host, instance.port
        );
        instance
    }

    /// Get the alive instances of a service
    pub async fn lookup(&self, name: &str) -> Result<Vec<ServiceInstance>> {
        let now = self.clock.now();

        let services = self.services.read().await;
        let instances = services
            .get(name)
            .ok_or_else(|| CoreError::ServiceNotFound(name.to_string()))?;

        let alive: Vec<ServiceInstance> = instances
            .iter()
            .filter(|i| self.is_alive(i, now))
            .cloned()
            .collect();

        if alive.is_empty() {
            debug!(
                "Service {} has {} instances, none alive",
                name,
                instances.len()
            );
            return Err(CoreError::Unavailable(name.to_string()));
        }

        Ok(alive)
    }

    /// List every registered service with its instance counts
    pub async fn list_services(&self) -> Vec<ServiceSummary> {
        let now = self.clock.now();

        let services = self.services.read().await;
        let mut summaries: Vec<ServiceSummary> = services
            .iter()
            .map(|(name, instances)| ServiceSummary {
                name: name.clone(),
                total: instances.len(),
                alive: instances.iter().filter(|i| self.is_alive(i, now)).count(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// Get count of registered service names
    pub async fn service_count(&self) -> usize {
        let services = self.services.read().await;
        services.len()
    }

    fn is_alive(&self, instance: &ServiceInstance, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(instance.last_heartbeat).to_std() {
            Ok(age) => age < self.ttl,
            // Heartbeat stamped after `now`: the clock stepped backwards
            Err(_) => true,
        }
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
