//! Sidecar injector - mutating admission webhook for Kubernetes pods

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sidecar_injector::config::Config;
use sidecar_injector::injector::Injector;
use sidecar_injector::server::serve;
use sidecar_injector::sidecar::SidecarSpec;
use sidecar_injector::webhook::WebhookState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // rustls needs a process-wide provider before any TLS config is built
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install aws-lc-rs crypto provider"))?;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let spec = SidecarSpec::load(&config.spec_path)?;
    let injector = Injector::new(spec, config.annotation_keys())?;
    tracing::info!(
        inject = %injector.keys().inject,
        status = %injector.keys().status,
        "Sidecar injector ready"
    );

    serve(config.server_config(), Arc::new(WebhookState::new(injector))).await?;
    Ok(())
}
