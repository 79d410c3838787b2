use serde::{Deserialize, Serialize};

/// Body of `POST /register`
///
/// Unknown fields (such as a client-supplied `last_heartbeat`) are ignored;
/// the registry always stamps the heartbeat itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl RegisterRequest {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }
}

/// Body returned by a successful registration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub status: String,
}

impl RegisterResponse {
    pub fn registered() -> Self {
        Self {
            status: "registered".to_string(),
        }
    }
}

/// Body of every error response from the registry and the gateway
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
