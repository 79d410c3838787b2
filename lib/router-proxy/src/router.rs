//! Route table mapping the first path segment to a service name

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Static routing table of the gateway
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RouteTable {
    /// First path segment -> logical service name
    routes: HashMap<String, String>,
}

impl RouteTable {
    pub fn new(routes: HashMap<String, String>) -> Self {
        Self { routes }
    }

    /// Load a route table from a YAML file of the form
    ///
    /// ```yaml
    /// routes:
    ///   classes: class-service
    /// ```
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        let table: RouteTable = serde_yaml::from_str(contents)?;
        Ok(table)
    }

    /// Resolve a request path to `(segment, service name)`
    pub fn resolve<'a>(&'a self, path: &'a str) -> Option<(&'a str, &'a str)> {
        let segment = first_segment(path);
        let service = self.routes.get(segment)?;
        debug!("Routed /{} to {}", segment, service);
        Some((segment, service.as_str()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        let routes = [
            ("classes", "class-service"),
            ("teachers", "teacher-service"),
            ("schedules", "schedule-service"),
        ]
        .into_iter()
        .map(|(segment, service)| (segment.to_string(), service.to_string()))
        .collect();
        Self { routes }
    }
}

/// First segment of a path, without slashes
pub fn first_segment(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or("")
}
