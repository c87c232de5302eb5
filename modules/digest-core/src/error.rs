//! Typed errors for configuration loading.

use thiserror::Error;

/// Errors raised while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),

    /// A profile value is out of range
    #[error("invalid profile value `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
