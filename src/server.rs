//! HTTPS server
//!
//! Serves the webhook router over TLS until SIGINT or SIGTERM, then stops
//! accepting connections and drains in-flight requests for a bounded grace
//! period.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::webhook::{webhook_router, WebhookState};
use crate::{Error, Result};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind the server
    pub addr: SocketAddr,
    /// TLS certificate PEM file
    pub cert_path: PathBuf,
    /// TLS private key PEM file
    pub key_path: PathBuf,
    /// How long in-flight requests may run after a shutdown signal
    pub shutdown_grace: Duration,
}

/// Serve the webhook until a shutdown signal arrives
pub async fn serve(config: ServerConfig, state: Arc<WebhookState>) -> Result<()> {
    let tls_config = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .map_err(|e| {
            Error::tls(format!(
                "failed to load {} / {}: {e}",
                config.cert_path.display(),
                config.key_path.display()
            ))
        })?;

    let handle = Handle::new();
    tokio::spawn(drain_on_signal(handle.clone(), config.shutdown_grace));

    info!(addr = %config.addr, "Starting sidecar injection webhook");

    axum_server::bind_rustls(config.addr, tls_config)
        .handle(handle)
        .serve(webhook_router(state).into_make_service())
        .await
        .map_err(|e| Error::server(format!("HTTPS server error: {e}")))?;

    info!("Webhook server stopped");
    Ok(())
}

/// Wait for a shutdown signal, then start a graceful shutdown on `handle`
async fn drain_on_signal(handle: Handle, grace: Duration) {
    match shutdown_signal().await {
        Ok(()) => {
            info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
            handle.graceful_shutdown(Some(grace));
        }
        Err(e) => {
            error!(error = %e, "Failed to install signal handlers; graceful shutdown disabled");
        }
    }
}

/// Resolve once SIGINT or SIGTERM is received
pub async fn shutdown_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injector::Injector;
    use crate::sidecar::SidecarSpec;
    use crate::webhook::policy::AnnotationKeys;

    fn state() -> Arc<WebhookState> {
        let injector = Injector::new(SidecarSpec::default(), AnnotationKeys::default()).unwrap();
        Arc::new(WebhookState::new(injector))
    }

    /// Story: missing TLS material is a startup failure, not a hang
    #[tokio::test]
    async fn story_missing_certificate_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            cert_path: dir.path().join("server.crt"),
            key_path: dir.path().join("server.key"),
            shutdown_grace: Duration::from_secs(1),
        };

        let err = serve(config, state()).await.unwrap_err();
        assert!(matches!(err, Error::Tls(_)));
        assert!(err.to_string().contains("server.crt"));
    }
}
