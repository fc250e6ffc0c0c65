//! # Server Runtime
//!
//! Plain HTTP serving goes through [`axum::serve`]. HTTPS terminates TLS with
//! `tokio-rustls` and hands each connection to `hyper-util`, one task per
//! connection.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, instrument, warn};

use crate::config::TlsFiles;
use crate::error::ServerError;
use crate::utils::constant::ACCEPT_ERROR_BACKOFF;

/// Serves `router` over plain HTTP until the listener fails.
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), ServerError> {
    info!(addr = %listener.local_addr()?, "Serving HTTP");
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}

/// Serves `router` over HTTPS using the given certificate chain and key.
///
/// TLS material is loaded before the first connection is accepted, so a bad
/// certificate or key fails startup. Handshake and per-connection errors are
/// logged and do not stop the accept loop.
pub async fn serve_tls(
    listener: TcpListener,
    router: Router,
    files: &TlsFiles,
) -> Result<(), ServerError> {
    let acceptor = TlsAcceptor::from(Arc::new(load_tls_config(files)?));
    info!(addr = %listener.local_addr()?, "Serving HTTPS");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                if is_connection_error(&e) {
                    debug!(error = %e, "Connection dropped before accept");
                } else {
                    warn!(error = %e, "Failed to accept connection, backing off");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
                continue;
            }
        };

        let acceptor = acceptor.clone();
        let service = TowerToHyperService::new(router.clone());

        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(stream).await {
                Ok(s) => s,
                Err(e) => {
                    warn!(%peer, error = %e, "TLS handshake failed");
                    return;
                }
            };
            debug!(%peer, "Accepted TLS connection");

            let builder = auto::Builder::new(TokioExecutor::new());
            if let Err(e) = builder
                .serve_connection(TokioIo::new(tls_stream), service)
                .await
            {
                warn!(%peer, error = %e, "Connection error");
            }
        });
    }
}

/// Errors scoped to one peer. Anything else (e.g. `EMFILE`) is listener-wide
/// and would repeat on an immediate retry.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

/// Builds a rustls server configuration from PEM files.
///
/// # Errors
///
/// Returns [`ServerError::Tls`] if a file cannot be read, holds no
/// certificate or private key, or the pair is rejected by rustls.
#[instrument(skip_all, fields(cert = %files.cert_path.display(), key = %files.key_path.display()))]
pub fn load_tls_config(files: &TlsFiles) -> Result<ServerConfig, ServerError> {
    let certs = load_certs(&files.cert_path)?;
    let key = load_key(&files.key_path)?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(format!("invalid certificate or key: {e}")))?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    debug!("Loaded TLS configuration");
    Ok(config)
}

fn open(path: &Path) -> Result<BufReader<File>, ServerError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ServerError::Tls(format!("cannot open {}: {e}", path.display())))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, ServerError> {
    let certs = rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Tls(format!("bad certificate in {}: {e}", path.display())))?;

    if certs.is_empty() {
        return Err(ServerError::Tls(format!(
            "no certificate found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, ServerError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|e| ServerError::Tls(format!("bad private key in {}: {e}", path.display())))?
        .ok_or_else(|| ServerError::Tls(format!("no private key found in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("healthz-rest-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_files_are_tls_errors() {
        let files = TlsFiles {
            cert_path: "/nonexistent/cert.pem".into(),
            key_path: "/nonexistent/key.pem".into(),
        };

        let err = load_tls_config(&files).unwrap_err();
        assert!(matches!(err, ServerError::Tls(ref msg) if msg.contains("/nonexistent/cert.pem")));
    }

    #[test]
    fn file_without_pem_blocks_is_rejected() {
        let cert = scratch_file("empty-cert.pem", "not a certificate\n");
        let key = scratch_file("empty-key.pem", "not a key\n");

        let err = load_certs(&cert).unwrap_err();
        assert!(matches!(err, ServerError::Tls(ref msg) if msg.contains("no certificate")));

        let err = load_key(&key).unwrap_err();
        assert!(matches!(err, ServerError::Tls(ref msg) if msg.contains("no private key")));

        std::fs::remove_file(cert).ok();
        std::fs::remove_file(key).ok();
    }

    #[test]
    fn only_peer_errors_skip_the_accept_backoff() {
        for kind in [
            io::ErrorKind::ConnectionRefused,
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::ConnectionReset,
        ] {
            assert!(is_connection_error(&io::Error::from(kind)), "{kind:?}");
        }

        // Descriptor exhaustion surfaces as a raw OS error with no dedicated kind.
        let emfile = io::Error::from_raw_os_error(24);
        assert!(!is_connection_error(&emfile));
        assert!(!is_connection_error(&io::Error::from(io::ErrorKind::OutOfMemory)));
    }

    #[tokio::test]
    async fn serve_tls_fails_fast_on_bad_material() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let files = TlsFiles {
            cert_path: "/nonexistent/cert.pem".into(),
            key_path: "/nonexistent/key.pem".into(),
        };

        let result = serve_tls(listener, crate::app(), &files).await;
        assert!(matches!(result, Err(ServerError::Tls(_))));
    }
}
