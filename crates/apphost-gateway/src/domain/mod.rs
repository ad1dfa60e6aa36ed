//! Domain types for the admin gateway: configuration, errors, DTOs.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, GatewayConfig};
pub use error::{ApiError, ApiResult, GatewayError};
