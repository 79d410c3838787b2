/// API version v1 of the registry wire format

pub mod instance;
pub mod registration;

pub use instance::{ServiceInstance, ServiceSummary};
pub use registration::{ErrorBody, RegisterRequest, RegisterResponse};

/// Path of the registration endpoint
pub const REGISTER_PATH: &str = "/register";
/// Path prefix of the lookup endpoint (`/services/{name}`)
pub const SERVICES_PATH: &str = "/services";
