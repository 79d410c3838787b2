//! Wire types shared by the service registry, the gateway and heartbeat clients
//!
//! This library defines the JSON bodies exchanged over HTTP:
//! - ServiceInstance: one running copy of a service, as returned by lookups
//! - RegisterRequest / RegisterResponse: the heartbeat registration call
//! - ServiceSummary: per-service instance counts for operators
//! - ErrorBody: the `{"detail": ...}` body of every error response

pub mod v1;

pub use v1::{ErrorBody, RegisterRequest, RegisterResponse, ServiceInstance, ServiceSummary};
