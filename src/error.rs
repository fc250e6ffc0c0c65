//! # Centralized Error Handling
//!
//! Error types for the three failure domains of the crate: outbound REST
//! calls ([`RestError`]), listen-address resolution ([`ConfigError`]) and
//! server startup ([`ServerError`]). Every operation returns these as
//! explicit `Result`s; nothing is retried or recovered internally.

use reqwest::StatusCode;
use thiserror::Error;

/// Outcome of a failed REST helper call or connector construction.
#[derive(Error, Debug)]
pub enum RestError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("failed to deserialize response body: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The server answered, but not with the status the caller asserted.
    /// `body` keeps the raw response text for diagnostics.
    #[error("unexpected status {actual} (expected {expected}): {body}")]
    UnexpectedStatus {
        actual: StatusCode,
        expected: StatusCode,
        body: String,
    },
}

/// Convenience Result type alias for the REST helpers.
pub type RestResult<T> = Result<T, RestError>;

/// Errors raised while resolving [`crate::config::ServerConfig`] from the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port `{0}`")]
    InvalidPort(String),

    #[error("`{present}` is set but `{missing}` is not")]
    IncompleteTls {
        present: &'static str,
        missing: &'static str,
    },
}

/// Fatal server-side failures. The binary logs these and exits.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS setup failed: {0}")]
    Tls(String),
}
