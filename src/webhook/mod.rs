//! Mutating admission webhook for sidecar injection
//!
//! Pods opt in with an annotation; the webhook answers every review with
//! `allowed: true` and, for opted-in pods not yet injected, a JSON patch that
//! appends the sidecar containers and volumes and sets the status annotation.
//!
//! - [`review`] - request validation and pod decoding
//! - [`policy`] - whether a pod should be injected
//! - [`patch`] - the JSON patch for an injected pod
//! - [`mutate`] - HTTP handler and response assembly

pub mod mutate;
pub mod patch;
pub mod policy;
pub mod review;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::injector::Injector;
use crate::MUTATE_PATH;

/// Shared state for webhook handlers
#[derive(Clone, Debug)]
pub struct WebhookState {
    /// Immutable injection state built at startup
    pub injector: Injector,
}

impl WebhookState {
    /// Create a new webhook state around the given injector
    pub fn new(injector: Injector) -> Self {
        Self { injector }
    }
}

/// Error type for webhook operations
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The request body was empty
    #[error("empty body")]
    EmptyBody,

    /// The request was not sent as JSON
    #[error("expected application/json, received {0:?}")]
    UnsupportedContentType(String),

    /// The admission review request was invalid or malformed
    #[error("invalid admission review: {0}")]
    InvalidReview(String),

    /// The patch could not be attached to the response
    #[error("patch serialization error: {0}")]
    PatchEncode(String),

    /// The response envelope could not be serialized
    #[error("serialization error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::EmptyBody
            | WebhookError::UnsupportedContentType(_)
            | WebhookError::InvalidReview(_) => StatusCode::BAD_REQUEST,
            WebhookError::PatchEncode(_) | WebhookError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

/// Create the webhook router
///
/// - POST /mutate - admission reviews for pods
/// - GET /healthz - liveness probe
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(MUTATE_PATH, post(mutate::mutate_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}
