//! Admission review decoding
//!
//! Turns the raw request body into a typed admission request, and the
//! embedded object into the small [`PodView`] the policy and patch builder
//! work from.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Pod;
use kube::core::admission::{AdmissionRequest, AdmissionReview};
use kube::core::DynamicObject;

use super::WebhookError;

/// Media type the API server uses for admission reviews
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The parts of a pod that drive injection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PodView {
    /// `metadata.annotations`, `None` when the pod has no annotation map
    pub annotations: Option<BTreeMap<String, String>>,
    /// Length of `spec.containers`
    pub container_count: usize,
    /// Length of `spec.volumes`
    pub volume_count: usize,
}

impl PodView {
    /// Project a decoded pod
    pub fn from_pod(pod: &Pod) -> Self {
        let spec = pod.spec.as_ref();
        Self {
            annotations: pod.metadata.annotations.clone(),
            container_count: spec.map_or(0, |s| s.containers.len()),
            volume_count: spec.and_then(|s| s.volumes.as_ref()).map_or(0, Vec::len),
        }
    }
}

/// Error decoding the object embedded in an admission request
#[derive(Debug, thiserror::Error)]
#[error("embedded object is not a pod: {0}")]
pub struct PodDecodeError(#[from] serde_json::Error);

/// Validate and decode an admission review body.
///
/// Rejects empty bodies, non-JSON content types and bodies that do not parse
/// as an `AdmissionReview` carrying a request.
pub fn decode_review(
    body: &[u8],
    content_type: Option<&str>,
) -> Result<AdmissionRequest<DynamicObject>, WebhookError> {
    if body.is_empty() {
        return Err(WebhookError::EmptyBody);
    }

    let content_type = content_type.unwrap_or_default();
    if !is_json(content_type) {
        return Err(WebhookError::UnsupportedContentType(content_type.to_string()));
    }

    let review: AdmissionReview<DynamicObject> = serde_json::from_slice(body)
        .map_err(|e| WebhookError::InvalidReview(e.to_string()))?;

    review
        .try_into()
        .map_err(|e: kube::core::admission::ConvertAdmissionReviewError| {
            WebhookError::InvalidReview(e.to_string())
        })
}

/// Decode the request's embedded object as a pod.
///
/// Returns `Ok(None)` when the request carries no object (e.g. DELETE).
pub fn pod_view(
    request: &AdmissionRequest<DynamicObject>,
) -> Result<Option<PodView>, PodDecodeError> {
    let Some(object) = request.object.as_ref() else {
        return Ok(None);
    };
    let pod: Pod = serde_json::from_value(serde_json::to_value(object)?)?;
    Ok(Some(PodView::from_pod(&pod)))
}

/// Compare the media type essence, ignoring parameters such as `charset`
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review_body(object: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
                "kind": {"group": "", "version": "v1", "kind": "Pod"},
                "resource": {"group": "", "version": "v1", "resource": "pods"},
                "name": "web-0",
                "namespace": "default",
                "operation": "CREATE",
                "userInfo": {"username": "system:serviceaccount:kube-system:replicaset-controller"},
                "object": object,
                "dryRun": false
            }
        }))
        .unwrap()
    }

    fn pod_json() -> serde_json::Value {
        json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "web-0",
                "annotations": {"sidecar.x/inject": "true"}
            },
            "spec": {
                "containers": [{"name": "web", "image": "nginx:1.27"}],
                "volumes": [
                    {"name": "data", "emptyDir": {}},
                    {"name": "cache", "emptyDir": {}}
                ]
            }
        })
    }

    #[test]
    fn empty_body_is_rejected() {
        let err = decode_review(b"", Some(JSON_CONTENT_TYPE)).unwrap_err();
        assert!(matches!(err, WebhookError::EmptyBody));
    }

    #[test]
    fn wrong_content_type_is_rejected() {
        let body = review_body(pod_json());
        let err = decode_review(&body, Some("application/yaml")).unwrap_err();
        assert!(
            matches!(err, WebhookError::UnsupportedContentType(ct) if ct == "application/yaml")
        );
    }

    #[test]
    fn missing_content_type_is_rejected() {
        let body = review_body(pod_json());
        let err = decode_review(&body, None).unwrap_err();
        assert!(matches!(err, WebhookError::UnsupportedContentType(_)));
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        let body = review_body(pod_json());
        assert!(decode_review(&body, Some("application/json; charset=utf-8")).is_ok());
        assert!(decode_review(&body, Some("Application/JSON")).is_ok());
    }

    #[test]
    fn garbage_body_is_invalid_review() {
        let err = decode_review(b"{not json", Some(JSON_CONTENT_TYPE)).unwrap_err();
        assert!(matches!(err, WebhookError::InvalidReview(_)));
    }

    #[test]
    fn review_without_request_is_invalid() {
        let body = br#"{"apiVersion":"admission.k8s.io/v1","kind":"AdmissionReview"}"#;
        let err = decode_review(body, Some(JSON_CONTENT_TYPE)).unwrap_err();
        assert!(matches!(err, WebhookError::InvalidReview(_)));
    }

    #[test]
    fn decodes_request_identity_and_pod() {
        let body = review_body(pod_json());
        let request = decode_review(&body, Some(JSON_CONTENT_TYPE)).unwrap();
        assert_eq!(request.uid, "705ab4f5-6393-11e8-b7cc-42010a800002");

        let view = pod_view(&request).unwrap().unwrap();
        assert_eq!(view.container_count, 1);
        assert_eq!(view.volume_count, 2);
        assert_eq!(
            view.annotations.unwrap().get("sidecar.x/inject").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn pod_without_annotations_has_none() {
        let body = review_body(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": "bare"},
            "spec": {"containers": []}
        }));
        let request = decode_review(&body, Some(JSON_CONTENT_TYPE)).unwrap();
        let view = pod_view(&request).unwrap().unwrap();

        assert_eq!(
            view,
            PodView {
                annotations: None,
                container_count: 0,
                volume_count: 0,
            }
        );
    }

    #[test]
    fn undecodable_pod_is_a_pod_decode_error() {
        let body = review_body(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": "broken"},
            "spec": {"containers": "not-a-list"}
        }));
        let request = decode_review(&body, Some(JSON_CONTENT_TYPE)).unwrap();
        assert!(pod_view(&request).is_err());
    }

    #[test]
    fn request_without_object_has_no_pod() {
        let body = review_body(serde_json::Value::Null);
        let request = decode_review(&body, Some(JSON_CONTENT_TYPE)).unwrap();
        assert!(pod_view(&request).unwrap().is_none());
    }
}
