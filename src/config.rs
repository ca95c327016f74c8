//! Command-line and environment configuration
//!
//! Every option has an environment-variable fallback so the webhook can be
//! configured from a Deployment manifest without overriding its command.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::server::ServerConfig;
use crate::webhook::policy::AnnotationKeys;
use crate::{DEFAULT_INJECT_ANNOTATION, DEFAULT_LISTEN_ADDR, DEFAULT_STATUS_ANNOTATION};

/// Sidecar injector - mutating admission webhook for Kubernetes pods
#[derive(Parser, Debug, Clone)]
#[command(name = "sidecar-injector", version, about, long_about = None)]
pub struct Config {
    /// Path to the sidecar specification (YAML)
    #[arg(long = "spec", env = "SIDECAR_SPEC", default_value = "./sidecarspec.yaml")]
    pub spec_path: PathBuf,

    /// Path to the server's PEM certificate
    #[arg(long = "cert", env = "TLS_CERT", default_value = "./server.crt")]
    pub cert_path: PathBuf,

    /// Path to the server's PEM private key
    #[arg(long = "key", env = "TLS_KEY", default_value = "./server.key")]
    pub key_path: PathBuf,

    /// Address the HTTPS server binds to
    #[arg(long = "listen", env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: SocketAddr,

    /// Annotation a pod sets to "true" to request injection
    #[arg(long, env = "INJECT_ANNOTATION", default_value = DEFAULT_INJECT_ANNOTATION)]
    pub inject_annotation: String,

    /// Annotation recording that injection already happened
    #[arg(long, env = "STATUS_ANNOTATION", default_value = DEFAULT_STATUS_ANNOTATION)]
    pub status_annotation: String,

    /// Seconds to wait for in-flight requests after a shutdown signal
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", default_value = "30")]
    pub shutdown_grace_secs: u64,
}

impl Config {
    /// Annotation keys consulted by the policy and written by the patch builder
    pub fn annotation_keys(&self) -> AnnotationKeys {
        AnnotationKeys::new(&self.inject_annotation, &self.status_annotation)
    }

    /// Listener settings for [`crate::server::serve`]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            addr: self.listen,
            cert_path: self.cert_path.clone(),
            key_path: self.key_path.clone(),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }
}
