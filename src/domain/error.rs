// Error taxonomy for the telemetry state engine
use std::time::Duration;
use thiserror::Error;

/// Connection-level failures. Always recovered locally by reconnecting or
/// waiting for the next poll tick.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("connection lost: {0}")]
    Stream(String),

    #[error("request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("{endpoint} responded with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("could not decode response body: {0}")]
    Decode(String),
}

/// Payload-level failures. The offending payload is dropped and held state is
/// left untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("malformed json: {0}")]
    Json(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a finite number")]
    NonFinite { field: &'static str },

    #[error("field `{field}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Startup-only failures. The core refuses to start on any of these.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    #[error("fetch timeout must be greater than zero")]
    ZeroTimeout,

    #[error("window capacity must be at least 1")]
    ZeroCapacity,

    #[error("invalid reconnect policy: {0}")]
    ReconnectPolicy(String),

    #[error("invalid listen address `{0}`")]
    ListenAddress(String),

    #[error("could not load configuration: {0}")]
    Source(String),
}

/// Outcome of a single failed audit fetch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuditFetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("fetch abandoned after {0:?}")]
    Timeout(Duration),
}
