#![allow(dead_code)]

use std::sync::Once;

use tokio::net::TcpListener;

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("healthz_rest=debug")
            .with_test_writer()
            .init();
    });
}

/// Spawns the health server on a random local port and returns its base address.
pub async fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");

    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        healthz_rest::serve(listener, healthz_rest::app())
            .await
            .unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

/// Self-signed `localhost`/`127.0.0.1` certificate and key checked in under `tests/fixtures`.
pub fn fixture_tls_files() -> healthz_rest::TlsFiles {
    let fixtures = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    healthz_rest::TlsFiles {
        cert_path: fixtures.join("cert.pem"),
        key_path: fixtures.join("key.pem"),
    }
}

/// Spawns the health server over HTTPS on a random local port and returns its base address.
pub async fn spawn_tls_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");

    let port = listener.local_addr().unwrap().port();
    let files = fixture_tls_files();

    tokio::spawn(async move {
        healthz_rest::serve_tls(listener, healthz_rest::app(), &files)
            .await
            .unwrap();
    });

    format!("https://127.0.0.1:{port}")
}
