use hyper::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failures the gateway reports to its callers
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The first path segment is not in the route table
    #[error("Service route not found: {0}")]
    RouteNotFound(String),

    /// The target service could not be discovered or has no alive instances
    #[error("Service '{0}' unavailable")]
    Unavailable(String),

    /// The chosen backend instance could not be reached
    #[error("Bad Gateway: Failed to connect to backend service {0}")]
    BadGateway(String),
}

impl GatewayError {
    /// HTTP status reported to the original caller
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::RouteNotFound("foo".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::Unavailable("class-service".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GatewayError::BadGateway("127.0.0.1:8001".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
