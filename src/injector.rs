//! Injection state
//!
//! [`Injector`] bundles the sidecar specification with the annotation keys
//! and is built once at startup, then shared read-only by every request.

use json_patch::Patch;

use crate::sidecar::SidecarSpec;
use crate::webhook::patch::PatchBuilder;
use crate::webhook::policy::{self, AnnotationKeys, Decision, SkipReason};
use crate::webhook::review::PodView;
use crate::{Error, Result};

/// What to do with a pod
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Allow the pod unchanged
    Skip(SkipReason),
    /// Allow the pod with this patch applied
    Patch(Patch),
}

/// Policy evaluator and patch builder over one immutable sidecar specification
#[derive(Clone, Debug)]
pub struct Injector {
    spec: SidecarSpec,
    keys: AnnotationKeys,
    builder: PatchBuilder,
}

impl Injector {
    /// Create an injector for `spec`, reading and writing `keys`
    pub fn new(spec: SidecarSpec, keys: AnnotationKeys) -> Result<Self> {
        let builder = PatchBuilder::new(&spec, keys.status.clone()).map_err(|e| {
            Error::serialization(format!("failed to render sidecar specification: {e}"))
        })?;
        Ok(Self { spec, keys, builder })
    }

    /// The sidecar specification this injector applies
    pub fn spec(&self) -> &SidecarSpec {
        &self.spec
    }

    /// The annotation keys this injector reads and writes
    pub fn keys(&self) -> &AnnotationKeys {
        &self.keys
    }

    /// Decide on `pod` and, when injecting, build its patch
    pub fn mutate(&self, pod: &PodView) -> Mutation {
        match policy::evaluate(pod.annotations.as_ref(), &self.keys) {
            Decision::Skip(reason) => Mutation::Skip(reason),
            Decision::Inject => Mutation::Patch(self.builder.build(pod)),
        }
    }
}
