//! Error types for the invoicing API client.
//!
//! # Design
//! `Api` covers every failure the service reports, whether through a non-2xx
//! status or through the `error` flag in an otherwise successful body. The
//! status is always the HTTP status of the response. Coercion failures carry
//! the resource and field that could not be converted so a broken contract is
//! easy to locate in logs.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `SfClient` parse methods and `SfApi` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered outside `[200, 300)` or flagged an application
    /// error in the body.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// A field of a present resource did not match its declared type.
    #[error("cannot coerce {resource}.{field}: {source}")]
    Coercion {
        resource: String,
        field: String,
        source: CoerceError,
    },

    /// The response body could not be decoded.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is incomplete.
    #[error("missing configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status attached to the error, if the service produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why a single raw value could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("required value is missing")]
    Missing,
    #[error("expected an integer, got {0}")]
    Int(String),
    #[error("expected a number, got {0}")]
    Float(String),
    #[error("expected a string, got {0}")]
    Str(String),
    #[error("expected a calendar date, got {0}")]
    Date(String),
    #[error("invalid embedded JSON: {0}")]
    Json(String),
    #[error("expected a record, got {0}")]
    NotRecord(String),
    #[error("expected a list of records, got {0}")]
    NotList(String),
}
