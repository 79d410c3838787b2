use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ServiceInstance is one running copy of a service, identified within its
/// service name by `(host, port)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Logical service name, e.g. `class-service`
    pub name: String,

    /// Host the instance listens on
    pub host: String,

    /// Port the instance listens on
    pub port: u16,

    /// Time of the most recent successful registration
    pub last_heartbeat: DateTime<Utc>,
}

impl ServiceInstance {
    /// Whether this instance has the same `(host, port)` identity
    pub fn same_address(&self, host: &str, port: u16) -> bool {
        self.host == host && self.port == port
    }

    /// `host:port` authority used to reach the instance; IPv6 literals
    /// are bracketed
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Instance counts for one registered service name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,

    /// Every stored instance, stale ones included
    pub total: usize,

    /// Instances whose heartbeat is within the TTL
    pub alive: usize,
}
