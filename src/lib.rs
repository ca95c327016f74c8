//! Sidecar injector - mutating admission webhook for Kubernetes pods
//!
//! An operator declares a sidecar once (a list of containers and volumes in a
//! YAML document) and every pod that opts in through an annotation gets those
//! containers and volumes attached at admission time, without touching the
//! pod's own manifest.
//!
//! # Request flow
//!
//! Review decoder -> injection policy -> patch builder -> response assembler.
//! The policy and the patch builder are pure functions over an immutable
//! [`sidecar::SidecarSpec`] loaded once at startup.
//!
//! # Modules
//!
//! - [`config`] - Command-line and environment configuration
//! - [`sidecar`] - Sidecar specification model and loader
//! - [`injector`] - Explicitly constructed injection state (spec + annotation keys)
//! - [`webhook`] - Admission review decoding, policy, patch building, HTTP handlers
//! - [`server`] - HTTPS server lifecycle and signal-driven graceful shutdown
//! - [`error`] - Error types for startup and serving

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod injector;
pub mod server;
pub mod sidecar;
pub mod webhook;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Path the API server posts admission reviews to
pub const MUTATE_PATH: &str = "/mutate";

/// Default annotation a pod sets to `"true"` to request injection
pub const DEFAULT_INJECT_ANNOTATION: &str = "sidecar.x/inject";

/// Default annotation recording that injection already happened
pub const DEFAULT_STATUS_ANNOTATION: &str = "sidecar.x/injected";

/// Default HTTPS listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:443";
