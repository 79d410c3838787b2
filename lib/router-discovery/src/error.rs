use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The registry has never seen this service name
    #[error("Service not found: {0}")]
    NotFound(String),

    /// The service is known but has no alive instances
    #[error("No instances available for service: {0}")]
    Unavailable(String),

    /// The registry answered with a status this client does not understand
    #[error("Unexpected registry response: {0}")]
    UnexpectedStatus(u16),

    /// The registry could not be reached, timed out, or sent an unreadable body
    #[error("Registry transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
