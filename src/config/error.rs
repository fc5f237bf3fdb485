//! Configuration errors.
//!
//! The `Display` text of each variant is the operator-facing message and is
//! matched verbatim by tests; do not reword.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Keys are sorted and comma-joined.
    #[error("Invalid {namespace} configuration keys: {}", .keys.join(", "))]
    UnknownKeys { namespace: String, keys: Vec<String> },

    #[error("{field} must be a number followed by a unit (s, m, h)")]
    DurationFormat { field: String },

    #[error("Invalid {field}")]
    InvalidDuration { field: String },

    #[error("shutdown_url must be a string")]
    ShutdownUrlNotString,

    #[error("shutdown_url must start with http")]
    ShutdownUrlScheme,

    #[error("shutdown_headers must be a dictionary")]
    ShutdownHeadersNotMap,

    #[error("shutdown_headers must be a dictionary of strings")]
    ShutdownHeadersNotStrings,

    #[error("shutdown_method must be a string")]
    ShutdownMethodNotString,

    #[error("shutdown_method must be one of GET, POST, PUT, DELETE, PATCH")]
    ShutdownMethodUnsupported,

    #[error("shutdown_body must be a string")]
    ShutdownBodyNotString,
}
