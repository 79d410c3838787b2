//! Core service registry functionality
//!
//! This library provides:
//! - Service registry holding instances and their heartbeats
//! - Liveness-filtered lookups against a configurable TTL
//! - The registry's HTTP API and the shared HTTP/1 accept loop

pub mod api;
pub mod clock;
pub mod error;
pub mod registry;
pub mod server;

pub use api::RegistryApi;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use registry::{ServiceRegistry, DEFAULT_TTL};
pub use server::{serve, Handler};
