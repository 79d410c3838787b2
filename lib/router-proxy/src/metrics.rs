//! Prometheus metrics middleware for observability

use crate::middleware::{Middleware, MiddlewareContext};
use crate::GatewayError;
use anyhow::Result;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tracing::debug;

/// Label used for requests that never reached the route table lookup
const UNROUTED: &str = "unrouted";

/// Prometheus metrics collector for gateway requests
#[derive(Clone)]
pub struct MetricsCollector {
    /// Requests by method and target service
    pub requests_total: CounterVec,
    /// Responses by status code
    pub responses_total: CounterVec,
    /// Gateway-level failures by kind
    pub errors_total: CounterVec,
    /// End-to-end latency by target service
    pub request_duration_seconds: HistogramVec,
    /// Prometheus registry for metrics
    pub registry: Arc<Registry>,
}

impl MetricsCollector {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let requests_total = CounterVec::new(
            Opts::new("gateway_requests_total", "Total requests handled by the gateway"),
            &["method", "service"],
        )?;

        let responses_total = CounterVec::new(
            Opts::new("gateway_responses_total", "Total gateway responses by status"),
            &["status"],
        )?;

        let errors_total = CounterVec::new(
            Opts::new("gateway_errors_total", "Gateway failures by kind"),
            &["kind"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "gateway_request_duration_seconds",
                "Gateway request latency in seconds",
            ),
            &["service"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(responses_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        Ok(Self {
            requests_total,
            responses_total,
            errors_total,
            request_duration_seconds,
            registry,
        })
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Prometheus metrics middleware
pub struct MetricsMiddleware {
    pub collector: MetricsCollector,
}

impl MetricsMiddleware {
    pub fn new(collector: MetricsCollector) -> Self {
        Self { collector }
    }
}

fn error_kind(error: &GatewayError) -> &'static str {
    match error {
        GatewayError::RouteNotFound(_) => "route_not_found",
        GatewayError::Unavailable(_) => "unavailable",
        GatewayError::BadGateway(_) => "bad_gateway",
    }
}

#[async_trait::async_trait]
impl Middleware for MetricsMiddleware {
    fn name(&self) -> &'static str {
        "MetricsMiddleware"
    }

    async fn on_response(&self, context: &MiddlewareContext, status: u16) {
        let service = context.service().unwrap_or_else(|| UNROUTED.to_string());
        debug!("Recording metrics for {} {} -> {}", context.method, service, status);

        self.collector
            .requests_total
            .with_label_values(&[&context.method, &service])
            .inc();
        self.collector
            .responses_total
            .with_label_values(&[&status.to_string()])
            .inc();
        self.collector
            .request_duration_seconds
            .with_label_values(&[&service])
            .observe(context.elapsed().as_secs_f64());
    }

    async fn on_error(&self, _context: &MiddlewareContext, error: &GatewayError) {
        self.collector
            .errors_total
            .with_label_values(&[error_kind(error)])
            .inc();
    }
}
