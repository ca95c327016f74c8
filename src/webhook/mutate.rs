//! Pod mutation handler
//!
//! Every well-formed review is answered with `allowed: true`. Pods the
//! policy skips, requests without an object, and objects that do not decode
//! as a pod all get an empty response; opted-in pods get a JSON patch.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use kube::core::admission::{AdmissionRequest, AdmissionResponse};
use kube::core::DynamicObject;
use tracing::{debug, error, info, warn};

use super::review::{decode_review, pod_view, JSON_CONTENT_TYPE};
use super::{WebhookError, WebhookState};
use crate::injector::{Injector, Mutation};

/// Handle a mutating admission review for pods
///
/// 1. Validates the body and content type, decodes the review
/// 2. Decodes the embedded pod
/// 3. Runs the injection policy and, if it passes, builds the patch
/// 4. Serializes the review response
pub async fn mutate_handler(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let request = decode_review(&body, content_type)
        .inspect_err(|e| warn!(error = %e, "Rejecting admission review"))?;

    let response = admit(&state.injector, &request)?;

    let payload = serde_json::to_vec(&response.into_review()).map_err(|e| {
        error!(uid = %request.uid, error = %e, "Failed to serialize admission review");
        WebhookError::Encode(e)
    })?;

    Ok(([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], payload).into_response())
}

/// Decide on a decoded request and build its response
pub fn admit(
    injector: &Injector,
    request: &AdmissionRequest<DynamicObject>,
) -> Result<AdmissionResponse, WebhookError> {
    let uid = request.uid.as_str();

    let pod = match pod_view(request) {
        Ok(Some(pod)) => pod,
        Ok(None) => {
            debug!(uid = %uid, "No object in request, allowing unchanged");
            return Ok(AdmissionResponse::from(request));
        }
        Err(e) => {
            warn!(uid = %uid, error = %e, "Failed to decode pod, allowing unchanged");
            return Ok(AdmissionResponse::from(request));
        }
    };

    let mutation = injector.mutate(&pod);
    match &mutation {
        Mutation::Skip(reason) => {
            debug!(
                uid = %uid,
                pod = %request.name,
                reason = %reason,
                "Skipping sidecar injection"
            );
        }
        Mutation::Patch(patch) => {
            info!(
                uid = %uid,
                pod = %request.name,
                namespace = ?request.namespace,
                patch_ops = patch.0.len(),
                "Injecting sidecar"
            );
        }
    }

    assemble(request, mutation)
        .inspect_err(|e| error!(uid = %uid, error = %e, "Failed to attach patch"))
}

/// Pack a mutation into the response for `request`
///
/// The response always allows the request and echoes its uid; a patch is
/// attached as `JSONPatch` when there is one.
pub fn assemble(
    request: &AdmissionRequest<DynamicObject>,
    mutation: Mutation,
) -> Result<AdmissionResponse, WebhookError> {
    let response = AdmissionResponse::from(request);
    match mutation {
        Mutation::Skip(_) => Ok(response),
        Mutation::Patch(patch) => response
            .with_patch(patch)
            .map_err(|e| WebhookError::PatchEncode(e.to_string())),
    }
}
