//! Middleware hooks around each proxied request

use crate::GatewayError;
use hyper::{body::Bytes, Request};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, span, Instrument, Level};

/// Context passed through middleware chain
#[derive(Clone, Debug)]
pub struct MiddlewareContext {
    /// Request path
    pub path: String,
    /// Request method
    pub method: String,
    /// When the gateway received the request
    pub started: Instant,
    /// Logical service the request was routed to, once known
    service: Arc<Mutex<Option<String>>>,
}

impl MiddlewareContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            started: Instant::now(),
            service: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a new middleware context from a request
    pub fn from_request(req: &Request<Bytes>) -> Self {
        Self::new(req.method().as_str(), req.uri().path())
    }

    /// Record the service chosen by the route table
    pub fn set_service(&self, service: &str) {
        if let Ok(mut s) = self.service.lock() {
            *s = Some(service.to_string());
        }
    }

    pub fn service(&self) -> Option<String> {
        self.service.lock().ok().and_then(|s| s.clone())
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Middleware trait for observing requests and responses
#[async_trait::async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in the middleware span
    fn name(&self) -> &'static str {
        "UnnamedMiddleware"
    }

    /// Called before the request is routed
    async fn on_request(&self, _context: &MiddlewareContext) {}

    /// Called once the response status is known, errors included
    async fn on_response(&self, _context: &MiddlewareContext, _status: u16) {}

    /// Called when routing, discovery or forwarding fails
    async fn on_error(&self, _context: &MiddlewareContext, _error: &GatewayError) {}
}

/// Chain of middleware to execute in order
pub struct MiddlewareChain {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// Add middleware to the chain
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    pub async fn on_request(&self, context: &MiddlewareContext) {
        for mw in &self.middleware {
            let span = span!(Level::DEBUG, "middleware", name = mw.name());
            mw.on_request(context).instrument(span).await;
        }
    }

    /// Process response through all middleware (in reverse order)
    pub async fn on_response(&self, context: &MiddlewareContext, status: u16) {
        for mw in self.middleware.iter().rev() {
            let span = span!(Level::DEBUG, "middleware", name = mw.name());
            mw.on_response(context, status).instrument(span).await;
        }
    }

    pub async fn on_error(&self, context: &MiddlewareContext, error: &GatewayError) {
        for mw in &self.middleware {
            let span = span!(Level::DEBUG, "middleware", name = mw.name());
            mw.on_error(context, error).instrument(span).await;
        }
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Access log of every proxied request
pub struct LoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "LoggingMiddleware"
    }

    async fn on_request(&self, context: &MiddlewareContext) {
        debug!("Request: {} {}", context.method, context.path);
    }

    async fn on_response(&self, context: &MiddlewareContext, status: u16) {
        info!(
            "{} {} -> {} via {} ({}ms)",
            context.method,
            context.path,
            status,
            context.service().as_deref().unwrap_or("-"),
            context.elapsed().as_millis()
        );
    }

    async fn on_error(&self, context: &MiddlewareContext, error: &GatewayError) {
        debug!("Error: {} {} - {}", context.method, context.path, error);
    }
}
