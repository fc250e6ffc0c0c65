//! # healthz-rest - Health-Check Server and JSON REST Helpers
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers (health check)
//! - [`config`] - Listen address and TLS file resolution from the environment
//! - [`server`] - Plain HTTP and HTTPS serving
//! - [`services`] - Outbound REST connector and Fetch/Create/Update helpers
//! - [`error`] - Error types
//! - [`utils`] - Constants

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod services;
pub mod utils;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::health_check;

pub use crate::config::{ServerConfig, TlsFiles};
pub use crate::error::{ConfigError, RestError, RestResult, ServerError};
pub use crate::server::{serve, serve_tls};
pub use crate::services::{ClientConfig, Credentials, RestConnector, TlsPolicy};

/// Creates the Axum router with the health routes.
///
/// `/`, `/healthz`, `/api/v1/healthz` and `/api/v1.0/healthz` all answer
/// `200 OK` with `"OK\n"`. Every request is traced.
pub fn app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/healthz", get(health_check))
        .route("/api/v1/healthz", get(health_check))
        .route("/api/v1.0/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
}
