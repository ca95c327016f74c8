//! Injection policy
//!
//! Decides from a pod's annotations alone whether the sidecar should be
//! injected. The guards run in a fixed order: missing annotations, already
//! injected, not requested. Later stages rely on all three having passed.

use std::collections::BTreeMap;

use crate::{DEFAULT_INJECT_ANNOTATION, DEFAULT_STATUS_ANNOTATION};

/// Annotation value that opts in, and that marks a pod as injected
pub const TRUE: &str = "true";

/// Annotation keys the webhook reads and writes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationKeys {
    /// Opt-in key; injection requires this to be exactly `"true"`
    pub inject: String,
    /// Marker key; set to `"true"` by the patch, and skipped when already `"true"`
    pub status: String,
}

impl AnnotationKeys {
    /// Create a key pair from the opt-in and marker annotation names
    pub fn new(inject: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            inject: inject.into(),
            status: status.into(),
        }
    }
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self::new(DEFAULT_INJECT_ANNOTATION, DEFAULT_STATUS_ANNOTATION)
    }
}

/// Why a pod was left alone
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The pod carries no annotation map at all
    NoAnnotations,
    /// The marker annotation is already `"true"`
    AlreadyInjected,
    /// The opt-in annotation is absent or not exactly `"true"`
    NotRequested,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoAnnotations => write!(f, "no annotations"),
            SkipReason::AlreadyInjected => write!(f, "already injected"),
            SkipReason::NotRequested => write!(f, "injection not requested"),
        }
    }
}

/// Outcome of the injection policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Leave the pod unchanged
    Skip(SkipReason),
    /// Build and return a patch
    Inject,
}

/// Evaluate the injection policy against a pod's annotations.
pub fn evaluate(annotations: Option<&BTreeMap<String, String>>, keys: &AnnotationKeys) -> Decision {
    let Some(annotations) = annotations else {
        return Decision::Skip(SkipReason::NoAnnotations);
    };

    if annotations.get(&keys.status).is_some_and(|v| v == TRUE) {
        return Decision::Skip(SkipReason::AlreadyInjected);
    }

    if !annotations.get(&keys.inject).is_some_and(|v| v == TRUE) {
        return Decision::Skip(SkipReason::NotRequested);
    }

    Decision::Inject
}
