//! # Application Constants
//!
//! Defaults for listen-address resolution, outbound client timeouts and the
//! health endpoint payload.

use std::time::Duration;

/// Body returned by every health route.
pub const HEALTH_RESPONSE_BODY: &str = "OK\n";

/// Host used when `BIND_ADDRESS` is unset or empty.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Port used when `PORT` is unset or empty.
pub const DEFAULT_PORT: u16 = 80;

pub const BIND_ADDRESS_VAR: &str = "BIND_ADDRESS";
pub const PORT_VAR: &str = "PORT";
pub const TLS_CERT_FILE_VAR: &str = "TLS_CERT_FILE";
pub const TLS_KEY_FILE_VAR: &str = "TLS_KEY_FILE";

/// Pause after a listener-wide `accept` failure before trying again.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Total time allowed for one outbound REST exchange, body included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed to establish the outbound TCP/TLS connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Filter used by the binary when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "healthz_rest=info,tower_http=info";
