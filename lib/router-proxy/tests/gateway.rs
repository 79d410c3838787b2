// Integration tests for the gateway against a live registry and live backends

use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use router_api::{ErrorBody, RegisterRequest};
use router_core::server::Handler;
use router_core::{serve, RegistryApi, ServiceRegistry};
use router_discovery::DiscoveryClient;
use router_proxy::{
    Gateway, LoggingMiddleware, MetricsCollector, MetricsMiddleware, MiddlewareChain,
    RandomSelector, RequestForwarder, RouteTable,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Backend that records hits and echoes what it received
struct EchoBackend {
    port: u16,
    hits: AtomicUsize,
}

#[async_trait::async_trait]
impl Handler for EchoBackend {
    async fn handle(&self, req: Request<Bytes>) -> Response<Full<Bytes>> {
        self.hits.fetch_add(1, Ordering::SeqCst);

        let status = if req.method() == Method::POST {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        let tag = req
            .headers()
            .get("x-client-tag")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = format!(
            "{} {} tag={} body={}",
            req.method(),
            req.uri(),
            tag,
            String::from_utf8_lossy(req.body())
        );

        Response::builder()
            .status(status)
            .header("x-backend-port", self.port.to_string())
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }
}

async fn start_registry() -> (SocketAddr, DiscoveryClient) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let api = Arc::new(RegistryApi::new(Arc::new(ServiceRegistry::new())));
    tokio::spawn(serve(listener, api));

    let client = DiscoveryClient::new(format!("http://{}", addr), Duration::from_secs(2))
        .expect("Failed to create discovery client");
    (addr, client)
}

async fn start_backend() -> Arc<EchoBackend> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let backend = Arc::new(EchoBackend {
        port,
        hits: AtomicUsize::new(0),
    });
    tokio::spawn(serve(listener, backend.clone()));
    backend
}

fn gateway(discovery: DiscoveryClient) -> Gateway {
    Gateway::new(
        discovery,
        RouteTable::default(),
        Arc::new(RandomSelector),
        RequestForwarder::new(Duration::from_secs(2)),
    )
}

fn request(method: Method, uri: &str, body: &str) -> Request<Bytes> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-client-tag", "teacher-ui")
        .body(Bytes::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: Response<Full<Bytes>>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_routes_to_exactly_one_of_two_instances() {
    let (_addr, discovery) = start_registry().await;
    let first = start_backend().await;
    let second = start_backend().await;

    for backend in [&first, &second] {
        discovery
            .register(&RegisterRequest::new("schedule-service", "127.0.0.1", backend.port))
            .await
            .unwrap();
    }

    let gateway = gateway(discovery);
    let response = gateway
        .handle(request(Method::GET, "/schedules", ""))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let served_by: u16 = response.headers()["x-backend-port"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(served_by == first.port || served_by == second.port);

    let hits = first.hits.load(Ordering::SeqCst) + second.hits.load(Ordering::SeqCst);
    assert_eq!(hits, 1);
}

#[tokio::test]
async fn test_forwards_method_path_query_headers_and_body() {
    let (_addr, discovery) = start_registry().await;
    let backend = start_backend().await;
    discovery
        .register(&RegisterRequest::new("class-service", "127.0.0.1", backend.port))
        .await
        .unwrap();

    let gateway = gateway(discovery);
    let response = gateway
        .handle(request(Method::POST, "/classes?profile=Science", r#"{"id":0,"name":"9-C"}"#))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_string(response).await,
        r#"POST /classes?profile=Science tag=teacher-ui body={"id":0,"name":"9-C"}"#
    );
}

#[tokio::test]
async fn test_unmapped_prefix_is_not_found() {
    let (_addr, discovery) = start_registry().await;
    let gateway = gateway(discovery);

    let response = gateway.handle(request(Method::GET, "/foo", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = gateway.handle(request(Method::DELETE, "/", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_service_is_unavailable() {
    let (_addr, discovery) = start_registry().await;
    let gateway = gateway(discovery);

    let response = gateway.handle(request(Method::GET, "/teachers", "")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let error: ErrorBody = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(error.detail, "Service 'teacher-service' unavailable");
}

#[tokio::test]
async fn test_unreachable_registry_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);

    let discovery = DiscoveryClient::new(format!("http://{}", dead), Duration::from_secs(2))
        .expect("Failed to create discovery client");
    let gateway = gateway(discovery);

    let response = gateway.handle(request(Method::GET, "/classes", "")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let (_addr, discovery) = start_registry().await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_port = listener.local_addr().unwrap().port();
    drop(listener);

    discovery
        .register(&RegisterRequest::new("class-service", "127.0.0.1", dead_port))
        .await
        .unwrap();

    let gateway = gateway(discovery);
    let response = gateway.handle(request(Method::GET, "/classes/1", "")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_spreads_load_across_instances() {
    let (_addr, discovery) = start_registry().await;
    let backends = [start_backend().await, start_backend().await];
    for backend in &backends {
        discovery
            .register(&RegisterRequest::new("teacher-service", "127.0.0.1", backend.port))
            .await
            .unwrap();
    }

    let gateway = gateway(discovery);
    for _ in 0..200 {
        let response = gateway.handle(request(Method::GET, "/teachers", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    for backend in &backends {
        let hits = backend.hits.load(Ordering::SeqCst);
        assert!((60..=140).contains(&hits), "backend {} got {} hits", backend.port, hits);
    }
}

#[tokio::test]
async fn test_healthz_and_metrics_are_reserved() {
    let (_addr, discovery) = start_registry().await;
    let collector = MetricsCollector::new().unwrap();
    let gateway = gateway(discovery)
        .with_middleware(
            MiddlewareChain::new()
                .add(LoggingMiddleware)
                .add(MetricsMiddleware::new(collector.clone())),
        )
        .with_metrics(collector);

    let response = gateway.handle(request(Method::GET, "/foo", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = gateway.handle(request(Method::GET, "/healthz", "")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = gateway.handle(request(Method::GET, "/metrics", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_string(response).await;
    assert!(text.contains(r#"gateway_errors_total{kind="route_not_found"} 1"#));
    assert!(text.contains(r#"gateway_responses_total{status="404"} 1"#));
}

#[tokio::test]
async fn test_every_request_resolves_afresh() {
    let (_addr, discovery) = start_registry().await;
    let gateway = gateway(discovery.clone());

    let response = gateway.handle(request(Method::GET, "/classes", "")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let backend = start_backend().await;
    discovery
        .register(&RegisterRequest::new("class-service", "127.0.0.1", backend.port))
        .await
        .unwrap();

    // Same gateway, no restart: the new instance is picked up immediately
    let response = gateway.handle(request(Method::GET, "/classes", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_backend_is_not_retried() {
    let (_addr, discovery) = start_registry().await;
    let live = start_backend().await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_port = listener.local_addr().unwrap().port();
    drop(listener);

    for port in [live.port, dead_port] {
        discovery
            .register(&RegisterRequest::new("teacher-service", "127.0.0.1", port))
            .await
            .unwrap();
    }

    let gateway = gateway(discovery);
    let mut ok = 0;
    let mut bad_gateway = 0;
    for _ in 0..40 {
        let response = gateway.handle(request(Method::GET, "/teachers", "")).await;
        match response.status() {
            StatusCode::OK => ok += 1,
            StatusCode::BAD_GATEWAY => bad_gateway += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert!(ok > 0, "live instance never chosen");
    assert!(bad_gateway > 0, "dead instance never chosen");
    // A 502 never falls back to the live instance
    assert_eq!(live.hits.load(Ordering::SeqCst), ok);
}
