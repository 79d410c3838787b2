//! Client side of service discovery
//!
//! Used by the gateway to resolve service names and by every service
//! instance to keep its registration fresh.

pub mod client;
pub mod error;
pub mod heartbeat;

pub use client::{DiscoveryClient, DEFAULT_DISCOVERY_TIMEOUT};
pub use error::{DiscoveryError, Result};
pub use heartbeat::{Heartbeat, HeartbeatStats, DEFAULT_HEARTBEAT_INTERVAL};
