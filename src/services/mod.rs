//! # REST Client Services
//!
//! Outbound JSON REST helpers.
//!
//! - **Connector** (`connector`) - Base URL, basic-auth credentials and HTTP client settings
//! - **Model Accessor** (`model_accessor`) - Fetch/Create/Update calls over a connector

pub mod connector;
pub mod model_accessor;

pub use connector::{ClientConfig, Credentials, RestConnector, RestConnectorBuilder, TlsPolicy};
