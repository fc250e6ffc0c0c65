//! # Health Check Handler
//!
//! Liveness endpoint for load balancers and orchestrators. It is mounted on
//! several paths; all of them behave identically.

use axum::http::StatusCode;
use tracing::{debug, instrument};

use crate::utils::constant::HEALTH_RESPONSE_BODY;

/// Health check endpoint that returns `200 OK` with the body `"OK\n"`.
///
/// Performs no checks and has no side effects.
#[instrument]
pub async fn health_check() -> (StatusCode, &'static str) {
    debug!("Health check endpoint accessed");
    (StatusCode::OK, HEALTH_RESPONSE_BODY)
}
