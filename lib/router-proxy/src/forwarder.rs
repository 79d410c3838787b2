//! HTTP request forwarding to backend instances

use crate::{GatewayError, Result};
use http_body_util::{BodyExt, Full};
use hyper::header::HeaderMap;
use hyper::{body::Bytes, Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::tokio::TokioExecutor;
use router_api::ServiceInstance;
use std::time::Duration;
use tokio::time::timeout as tokio_timeout;
use tracing::{debug, warn};

/// Default bound on one backend exchange
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP request forwarder for proxying requests to backend instances
/// with connection pooling and timeout support.
///
/// Exactly one attempt is made per request. A connect failure, an I/O error
/// or a timeout all surface as [`GatewayError::BadGateway`].
pub struct RequestForwarder {
    client: Client<HttpConnector, Full<Bytes>>,
    timeout: Duration,
}

impl RequestForwarder {
    pub fn new(timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));
        connector.set_keepalive(Some(Duration::from_secs(30)));

        let client = Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(connector);

        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward a request to `instance`, keeping its path and query string
    pub async fn forward(
        &self,
        instance: &ServiceInstance,
        request: Request<Bytes>,
    ) -> Result<Response<Full<Bytes>>> {
        let (mut parts, body) = request.into_parts();
        let target = target_uri(instance, &parts.uri)?;

        debug!(
            "Forwarding {} {} ({} headers, {} bytes)",
            parts.method,
            target,
            parts.headers.len(),
            body.len()
        );

        parts.uri = target;
        parts.headers = strip_hop_by_hop(&parts.headers);
        let forwarded = Request::from_parts(parts, Full::new(body));

        let exchange = async {
            let response = self.client.request(forwarded).await?;
            let (parts, body) = response.into_parts();
            let bytes = body.collect().await?.to_bytes();
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>((parts, bytes))
        };

        match tokio_timeout(self.timeout, exchange).await {
            Ok(Ok((mut parts, bytes))) => {
                debug!("Backend {} responded with {}", instance.authority(), parts.status);
                parts.headers = strip_hop_by_hop(&parts.headers);
                Ok(Response::from_parts(parts, Full::new(bytes)))
            }
            Ok(Err(e)) => {
                warn!("Backend {} request error: {}", instance.authority(), e);
                Err(GatewayError::BadGateway(instance.authority()))
            }
            Err(_) => {
                warn!(
                    "Backend {} request timeout after {:?}",
                    instance.authority(),
                    self.timeout
                );
                Err(GatewayError::BadGateway(instance.authority()))
            }
        }
    }
}

/// Build `http://{host}:{port}{path}?{query}` for an instance
pub fn target_uri(instance: &ServiceInstance, original: &Uri) -> Result<Uri> {
    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("http://{}{}", instance.authority(), path_and_query);

    url.parse().map_err(|e| {
        warn!("Invalid backend URL {}: {}", url, e);
        GatewayError::BadGateway(instance.authority())
    })
}

/// Copy headers, dropping hop-by-hop ones and keeping repeated values
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_hop_by_hop_header(name.as_str()) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// Check if header is hop-by-hop (should not be forwarded)
fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name,
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}
