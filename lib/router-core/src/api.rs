//! HTTP API of the service registry
//!
//! - `POST /register` upserts an instance
//! - `GET /services/{name}` returns the alive instances of a service
//! - `GET /services` lists every service with instance counts
//! - `GET /healthz` liveness probe

use crate::server::{json_response, text_response, Handler};
use crate::{CoreError, ServiceRegistry};
use http_body_util::Full;
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use router_api::v1::{REGISTER_PATH, SERVICES_PATH};
use router_api::{ErrorBody, RegisterRequest, RegisterResponse};
use std::sync::Arc;
use tracing::{debug, info};

/// Request handler exposing a [`ServiceRegistry`] over HTTP
pub struct RegistryApi {
    registry: Arc<ServiceRegistry>,
}

impl RegistryApi {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    async fn register(&self, body: &Bytes) -> Response<Full<Bytes>> {
        let request: RegisterRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                debug!("Rejected registration body: {}", e);
                return json_response(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    &ErrorBody::new(format!("Invalid registration: {}", e)),
                );
            }
        };

        let instance = self.registry.register(request).await;
        info!(
            "Registered: {} at {}:{}",
            instance.name, instance.host, instance.port
        );
        json_response(StatusCode::OK, &RegisterResponse::registered())
    }

    async fn lookup(&self, name: &str) -> Response<Full<Bytes>> {
        match self.registry.lookup(name).await {
            Ok(instances) => json_response(StatusCode::OK, &instances),
            Err(CoreError::ServiceNotFound(_)) => {
                json_response(StatusCode::NOT_FOUND, &ErrorBody::new("Service not found"))
            }
            Err(CoreError::Unavailable(_)) => json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &ErrorBody::new("No instances available"),
            ),
        }
    }
}

#[async_trait::async_trait]
impl Handler for RegistryApi {
    async fn handle(&self, req: Request<Bytes>) -> Response<Full<Bytes>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        debug!("{} {}", method, path);

        if path == REGISTER_PATH {
            return match method {
                Method::POST => self.register(req.body()).await,
                _ => method_not_allowed(),
            };
        }

        if path == SERVICES_PATH {
            return match method {
                Method::GET => json_response(StatusCode::OK, &self.registry.list_services().await),
                _ => method_not_allowed(),
            };
        }

        if let Some(name) = service_name(&path) {
            return match method {
                Method::GET => self.lookup(&name).await,
                _ => method_not_allowed(),
            };
        }

        if path == "/healthz" {
            return text_response(StatusCode::OK, "OK\n");
        }

        json_response(StatusCode::NOT_FOUND, &ErrorBody::new("Not Found"))
    }
}

/// Extract and percent-decode `{name}` from `/services/{name}`
fn service_name(path: &str) -> Option<String> {
    let segment = path.strip_prefix(SERVICES_PATH)?.strip_prefix('/')?;
    if segment.is_empty() || segment.contains('/') {
        return None;
    }
    let name = urlencoding::decode(segment).ok()?;
    Some(name.into_owned())
}

fn method_not_allowed() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorBody::new("Method Not Allowed"),
    )
}
