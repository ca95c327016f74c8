//! Sidecar specification
//!
//! The sidecar document is a YAML file with two ordered lists, `containers`
//! and `volumes`, each element shaped like the Kubernetes core/v1 type of the
//! same name. It is loaded once at startup and never mutated afterwards.

use std::path::Path;

use k8s_openapi::api::core::v1::{Container, Volume};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Containers and volumes attached to every opted-in pod, in injection order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SidecarSpec {
    /// Containers appended to `spec.containers`
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Volumes appended to `spec.volumes`
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

impl SidecarSpec {
    /// Parse a sidecar document from YAML text.
    ///
    /// An empty document yields an empty specification.
    pub fn from_yaml(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(input)
            .map_err(|e| Error::config(format!("invalid sidecar specification: {e}")))
    }

    /// Read and parse the sidecar document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read sidecar specification {}: {e}",
                path.display()
            ))
        })?;
        let spec =
            Self::from_yaml(&raw).map_err(|e| Error::config(format!("{}: {e}", path.display())))?;

        if spec.is_empty() {
            warn!(
                path = %path.display(),
                "Sidecar specification is empty; only the status annotation will be set"
            );
        }
        info!(
            path = %path.display(),
            containers = spec.containers.len(),
            volumes = spec.volumes.len(),
            "Loaded sidecar specification"
        );
        Ok(spec)
    }

    /// True when there is nothing to inject besides the status annotation
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.volumes.is_empty()
    }
}
