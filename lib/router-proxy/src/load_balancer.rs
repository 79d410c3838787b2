//! Load balancing strategies for choosing among alive instances

use rand::seq::SliceRandom;
use router_api::ServiceInstance;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Picks one instance out of the alive set returned by the registry
pub trait InstanceSelector: Send + Sync {
    fn choose<'a>(&self, instances: &'a [ServiceInstance]) -> Option<&'a ServiceInstance>;
}

/// Load balancing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadBalancingStrategy {
    /// Uniform random choice per request
    #[default]
    Random,
    /// Rotate through instances in lookup order
    RoundRobin,
}

impl LoadBalancingStrategy {
    /// Build the selector implementing this strategy
    pub fn selector(self) -> Arc<dyn InstanceSelector> {
        match self {
            LoadBalancingStrategy::Random => Arc::new(RandomSelector),
            LoadBalancingStrategy::RoundRobin => Arc::new(RoundRobinSelector::new()),
        }
    }
}

impl FromStr for LoadBalancingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(LoadBalancingStrategy::Random),
            "round-robin" | "round_robin" | "roundrobin" => Ok(LoadBalancingStrategy::RoundRobin),
            other => Err(format!("unknown load balancing strategy: {}", other)),
        }
    }
}

/// Uniform random selection
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl InstanceSelector for RandomSelector {
    fn choose<'a>(&self, instances: &'a [ServiceInstance]) -> Option<&'a ServiceInstance> {
        instances.choose(&mut rand::thread_rng())
    }
}

/// Round-robin selection over the slice it is handed.
///
/// The registry returns alive instances in no guaranteed order, so the
/// rotation is only even while the alive set is stable.
#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    counter: AtomicUsize,
}

impl RoundRobinSelector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstanceSelector for RoundRobinSelector {
    fn choose<'a>(&self, instances: &'a [ServiceInstance]) -> Option<&'a ServiceInstance> {
        if instances.is_empty() {
            return None;
        }

        let current = self.counter.fetch_add(1, Ordering::Relaxed);
        instances.get(current % instances.len())
    }
}
