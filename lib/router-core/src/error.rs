use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The name was never registered
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// The name is known but every instance is stale
    #[error("No instances available for service: {0}")]
    Unavailable(String),
}
