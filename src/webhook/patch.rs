//! JSON patch construction
//!
//! Containers and volumes are handled the same way. If the pod's array is
//! empty, the first sidecar element creates it with a one-element array and
//! every later element appends with `/-`. If the array already has entries,
//! every element appends. The status annotation is written last.

use json_patch::{AddOperation, Patch, PatchOperation, ReplaceOperation};
use jsonptr::PointerBuf;
use serde_json::Value;

use super::policy::TRUE;
use super::review::PodView;
use crate::sidecar::SidecarSpec;

/// Builds the patch for one pod from a pre-rendered sidecar specification.
///
/// Sidecar containers and volumes are rendered to JSON once, at
/// construction, so [`PatchBuilder::build`] cannot fail.
#[derive(Clone, Debug)]
pub struct PatchBuilder {
    containers: Vec<Value>,
    volumes: Vec<Value>,
    status_key: String,
}

impl PatchBuilder {
    /// Render the sidecar specification for patching.
    pub fn new(
        spec: &SidecarSpec,
        status_key: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            containers: spec
                .containers
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
            volumes: spec
                .volumes
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
            status_key: status_key.into(),
        })
    }

    /// Build the ordered patch operations for `pod`.
    pub fn build(&self, pod: &PodView) -> Patch {
        let mut ops = Vec::with_capacity(self.containers.len() + self.volumes.len() + 1);

        push_array_ops(&mut ops, "containers", pod.container_count > 0, &self.containers);
        push_array_ops(&mut ops, "volumes", pod.volume_count > 0, &self.volumes);
        ops.push(self.status_op(pod));

        Patch(ops)
    }

    fn status_op(&self, pod: &PodView) -> PatchOperation {
        let present = pod
            .annotations
            .as_ref()
            .is_some_and(|a| a.contains_key(&self.status_key));

        if present {
            let key = self.status_key.as_str();
            PatchOperation::Replace(ReplaceOperation {
                path: PointerBuf::from_tokens(["metadata", "annotations", key]),
                value: Value::String(TRUE.to_string()),
            })
        } else {
            let mut entry = serde_json::Map::new();
            entry.insert(self.status_key.clone(), Value::String(TRUE.to_string()));
            PatchOperation::Add(AddOperation {
                path: PointerBuf::from_tokens(["metadata", "annotations", "-"]),
                value: Value::Object(entry),
            })
        }
    }
}

/// Emit one `add` per element under `/spec/{field}`.
fn push_array_ops(ops: &mut Vec<PatchOperation>, field: &str, non_empty: bool, items: &[Value]) {
    let mut non_empty = non_empty;
    for item in items {
        if non_empty {
            ops.push(PatchOperation::Add(AddOperation {
                path: PointerBuf::from_tokens(["spec", field, "-"]),
                value: item.clone(),
            }));
        } else {
            ops.push(PatchOperation::Add(AddOperation {
                path: PointerBuf::from_tokens(["spec", field]),
                value: Value::Array(vec![item.clone()]),
            }));
            non_empty = true;
        }
    }
}
