//! Routing gateway: resolve, pick an instance, forward

use crate::forwarder::RequestForwarder;
use crate::load_balancer::InstanceSelector;
use crate::metrics::MetricsCollector;
use crate::middleware::{MiddlewareChain, MiddlewareContext};
use crate::router::{first_segment, RouteTable};
use crate::{GatewayError, Result};
use http_body_util::Full;
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use router_api::ErrorBody;
use router_core::server::{json_response, text_response, Handler};
use router_discovery::DiscoveryClient;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stateless HTTP gateway in front of the registered services.
///
/// Every request is resolved against the registry afresh; nothing is cached
/// and a failed backend is never retried.
pub struct Gateway {
    discovery: DiscoveryClient,
    routes: RouteTable,
    selector: Arc<dyn InstanceSelector>,
    forwarder: RequestForwarder,
    middleware: MiddlewareChain,
    metrics: Option<MetricsCollector>,
}

impl Gateway {
    pub fn new(
        discovery: DiscoveryClient,
        routes: RouteTable,
        selector: Arc<dyn InstanceSelector>,
        forwarder: RequestForwarder,
    ) -> Self {
        Self {
            discovery,
            routes,
            selector,
            forwarder,
            middleware: MiddlewareChain::new(),
            metrics: None,
        }
    }

    pub fn with_middleware(mut self, middleware: MiddlewareChain) -> Self {
        self.middleware = middleware;
        self
    }

    /// Serve `GET /metrics` from this collector
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Route and forward one request
    pub async fn proxy(
        &self,
        context: &MiddlewareContext,
        req: Request<Bytes>,
    ) -> Result<Response<Full<Bytes>>> {
        let path = req.uri().path();
        let service = match self.routes.resolve(path) {
            Some((_, service)) => service.to_string(),
            None => return Err(GatewayError::RouteNotFound(first_segment(path).to_string())),
        };
        context.set_service(&service);

        let instances = self.discovery.lookup(&service).await.map_err(|e| {
            warn!("Discovery of {} failed: {}", service, e);
            GatewayError::Unavailable(service.clone())
        })?;

        let instance = self
            .selector
            .choose(&instances)
            .ok_or_else(|| GatewayError::Unavailable(service.clone()))?;
        debug!(
            "Selected {}:{} for {} out of {} instances",
            instance.host,
            instance.port,
            service,
            instances.len()
        );

        self.forwarder.forward(instance, req).await
    }

    fn reserved(&self, req: &Request<Bytes>) -> Option<Response<Full<Bytes>>> {
        if req.method() != Method::GET {
            return None;
        }

        match req.uri().path() {
            "/healthz" => Some(text_response(StatusCode::OK, "OK\n")),
            "/metrics" => {
                let metrics = self.metrics.as_ref()?;
                let text = metrics
                    .gather()
                    .unwrap_or_else(|_| "Failed to gather metrics\n".to_string());
                let mut response = text_response(StatusCode::OK, text);
                response.headers_mut().insert(
                    hyper::header::CONTENT_TYPE,
                    hyper::header::HeaderValue::from_static("text/plain; version=0.0.4"),
                );
                Some(response)
            }
            _ => None,
        }
    }
}

#[async_trait::async_trait]
impl Handler for Gateway {
    async fn handle(&self, req: Request<Bytes>) -> Response<Full<Bytes>> {
        if let Some(response) = self.reserved(&req) {
            return response;
        }

        let context = MiddlewareContext::from_request(&req);
        self.middleware.on_request(&context).await;

        let response = match self.proxy(&context, req).await {
            Ok(response) => response,
            Err(e) => {
                self.middleware.on_error(&context, &e).await;
                json_response(e.status(), &ErrorBody::new(e.to_string()))
            }
        };

        self.middleware
            .on_response(&context, response.status().as_u16())
            .await;
        response
    }
}
