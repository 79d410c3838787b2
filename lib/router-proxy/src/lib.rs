//! HTTP gateway: route table, instance selection and request forwarding
pub mod error;
pub mod forwarder;
pub mod gateway;
pub mod load_balancer;
pub mod metrics;
pub mod middleware;
pub mod router;

pub use error::{GatewayError, Result};
pub use forwarder::{RequestForwarder, DEFAULT_BACKEND_TIMEOUT};
pub use gateway::Gateway;
pub use load_balancer::{InstanceSelector, LoadBalancingStrategy, RandomSelector, RoundRobinSelector};
pub use metrics::{MetricsCollector, MetricsMiddleware};
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareChain, MiddlewareContext};
pub use router::RouteTable;
