//! # REST Connector
//!
//! A [`RestConnector`] bundles everything needed to reach one JSON backend:
//! the target URL, optional basic-auth credentials and a configured HTTP
//! client. Constructing one performs no I/O.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Url};
use secrecy::SecretString;
use tracing::{Span, info_span, warn};

use crate::error::{RestError, RestResult};
use crate::utils::constant::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};

/// Server certificate handling for outbound HTTPS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsPolicy {
    #[default]
    Verify,
    /// Accept self-signed or otherwise invalid certificates.
    AcceptInvalidCertificates,
}

/// HTTP client settings applied to every request of a connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whole-exchange timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub tls: TlsPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            tls: TlsPolicy::Verify,
        }
    }
}

impl ClientConfig {
    fn build_client(&self) -> RestResult<Client> {
        let mut builder = Client::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if self.tls == TlsPolicy::AcceptInvalidCertificates {
            warn!("TLS certificate verification is disabled for this connector");
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(|e| {
            RestError::InvalidConfiguration(format!("failed to build HTTP client: {e}"))
        })
    }
}

/// Basic-auth username and password.
///
/// The password is held as a [`SecretString`] and is redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns [`RestError::InvalidConfiguration`] if `username` is empty.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> RestResult<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(RestError::InvalidConfiguration(
                "basic-auth username must not be empty".to_string(),
            ));
        }

        Ok(Self {
            username,
            password: SecretString::from(password.into()),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Connection parameters for one backend.
///
/// Immutable once built. Cloning is cheap: the underlying [`Client`] is
/// reference counted. Each connector owns a tracing [`Span`] that every
/// request span is parented to. Callers may hand in their own span through
/// [`RestConnectorBuilder::span`]; otherwise a `rest_connector` span is created.
#[derive(Clone)]
pub struct RestConnector {
    pub(crate) base_url: Url,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) client: Client,
    pub(crate) span: Span,
}

impl fmt::Debug for RestConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestConnector")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl RestConnector {
    /// Creates a connector for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidConfiguration`] if the URL is empty or not
    /// an absolute URL, or if the HTTP client cannot be built.
    pub fn new(
        base_url: impl AsRef<str>,
        credentials: Option<Credentials>,
        config: ClientConfig,
    ) -> RestResult<Self> {
        let raw = base_url.as_ref().trim();
        if raw.is_empty() {
            return Err(RestError::InvalidConfiguration(
                "base URL must not be empty".to_string(),
            ));
        }

        let base_url = Url::parse(raw).map_err(|e| {
            RestError::InvalidConfiguration(format!("invalid base URL `{raw}`: {e}"))
        })?;

        let client = config.build_client()?;
        let span = info_span!(
            "rest_connector",
            base_url = %base_url,
            basic_auth = credentials.is_some()
        );

        Ok(Self {
            base_url,
            credentials,
            client,
            span,
        })
    }

    /// Starts a [`RestConnectorBuilder`] with default client settings.
    pub fn builder(base_url: impl Into<String>) -> RestConnectorBuilder {
        RestConnectorBuilder {
            base_url: base_url.into(),
            credentials: None,
            config: ClientConfig::default(),
            span: None,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// The span request spans are attached to.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// Fluent construction of a [`RestConnector`].
#[derive(Debug)]
pub struct RestConnectorBuilder {
    base_url: String,
    credentials: Option<(String, String)>,
    config: ClientConfig,
    span: Option<Span>,
}

impl RestConnectorBuilder {
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Removes both timeouts.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self.config.connect_timeout = None;
        self
    }

    pub fn tls_policy(mut self, tls: TlsPolicy) -> Self {
        self.config.tls = tls;
        self
    }

    /// Parents all request spans of the connector to `span` instead of a fresh one.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> RestResult<RestConnector> {
        let credentials = self
            .credentials
            .map(|(username, password)| Credentials::new(username, password))
            .transpose()?;
        let mut connector = RestConnector::new(self.base_url, credentials, self.config)?;
        if let Some(span) = self.span {
            connector.span = span;
        }
        Ok(connector)
    }
}
