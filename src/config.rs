//! # Server Configuration
//!
//! Resolves the listen address and optional TLS material from environment
//! variables. Empty values are treated as absent.
//!
//! | Variable        | Default   |
//! |-----------------|-----------|
//! | `BIND_ADDRESS`  | `0.0.0.0` |
//! | `PORT`          | `80`      |
//! | `TLS_CERT_FILE` | unset     |
//! | `TLS_KEY_FILE`  | unset     |

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ConfigError;
use crate::utils::constant::*;

/// Certificate chain and private key, both PEM encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// When present the server speaks HTTPS instead of HTTP.
    pub tls: Option<TlsFiles>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            tls: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidPort`] if `PORT` is not a valid `u16`
    /// - [`ConfigError::IncompleteTls`] if only one of the TLS file variables is set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_address =
            var(BIND_ADDRESS_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let port = match var(PORT_VAR) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let tls = match (var(TLS_CERT_FILE_VAR), var(TLS_KEY_FILE_VAR)) {
            (Some(cert), Some(key)) => Some(TlsFiles {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompleteTls {
                    present: TLS_CERT_FILE_VAR,
                    missing: TLS_KEY_FILE_VAR,
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteTls {
                    present: TLS_KEY_FILE_VAR,
                    missing: TLS_CERT_FILE_VAR,
                });
            }
        };

        let config = Self {
            bind_address,
            port,
            tls,
        };
        debug!(?config, "Resolved server configuration");
        Ok(config)
    }

    /// The `host:port` string the server binds to.
    ///
    /// Bare IPv6 hosts are bracketed so the result stays parseable.
    pub fn listen_address(&self) -> String {
        if self.bind_address.contains(':') && !self.bind_address.starts_with('[') {
            format!("[{}]:{}", self.bind_address, self.port)
        } else {
            format!("{}:{}", self.bind_address, self.port)
        }
    }
}
