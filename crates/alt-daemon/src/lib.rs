// SPDX-License-Identifier: MIT OR Apache-2.0
//! HTTP surface for the alt-text pipeline (§4.1, §6, §11).
//!
//! [`build_app`] wires three routes onto an [`AppState`]: `GET /health`
//! (§11, supplemented), `POST /login` (§4.1, opaque session token), and
//! `POST /describe` (§4.1, §4.2) — the webhook entry point that dispatches
//! validation handshakes, blob-created events, and direct requests into
//! [`PipelineOrchestrator::run`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod middleware;
pub mod session;
pub mod transport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use alt_core::event::{EventKind, ImageEvent, BLOB_CREATED_EVENT, SUBSCRIPTION_VALIDATION_EVENT};
use alt_core::is_image_blob;
use alt_error::{AltError, ErrorBody, ErrorCode};
use alt_orchestrator::{OrchestratorInput, PipelineOrchestrator};
use alt_storage::StorageTransport;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Shared state behind every handler.
pub struct AppState<S: StorageTransport> {
    orchestrator: PipelineOrchestrator<S>,
    started_at: Instant,
    requests_served: AtomicU64,
}

impl<S: StorageTransport> AppState<S> {
    /// Build state around an already-constructed orchestrator.
    pub fn new(orchestrator: PipelineOrchestrator<S>) -> Self {
        Self { orchestrator, started_at: Instant::now(), requests_served: AtomicU64::new(0) }
    }
}

/// Build the Axum router for one [`AppState`].
pub fn build_app<S>(state: Arc<AppState<S>>) -> Router
where
    S: StorageTransport + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_handler::<S>))
        .route("/login", post(login_handler::<S>))
        .route("/describe", post(describe_handler::<S>))
        .layer(axum::middleware::from_fn(middleware::request_logger_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .with_state(state)
}

/// Wraps an [`AltError`] so it can be returned directly from a handler.
pub struct ApiError(AltError);

impl From<AltError> for ApiError {
    fn from(err: AltError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = (&self.0).into();
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

async fn health_handler<S: StorageTransport + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let uptime_seconds = state.started_at.elapsed().as_secs();
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp(),
        "uptime_seconds": uptime_seconds,
    }))
}

// ---------------------------------------------------------------------------
// POST /login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct LoginRequest {
    #[serde(default)]
    tenant_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

async fn login_handler<S: StorageTransport + Send + Sync + 'static>(
    State(_state): State<Arc<AppState<S>>>,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    let req: LoginRequest = if body.is_empty() {
        LoginRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(_) => return ApiError::from(AltError::new(ErrorCode::InvalidJsonBody, "login body is not valid JSON")).into_response(),
        }
    };

    let minted = session::mint(req.tenant_id.clone(), req.user_id.clone());
    Json(json!({
        "status": "ok",
        "session_token": minted.token,
        "tenant_id": req.tenant_id,
        "user_id": req.user_id,
        "expires_in": minted.expires_in,
    }))
    .into_response()
}

// ---------------------------------------------------------------------------
// POST /describe
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DirectDescribeRequest {
    #[serde(rename = "blobName")]
    blob_name: Option<String>,
    #[serde(default)]
    sidecar: Option<alt_core::MetadataDocument>,
    #[serde(rename = "cmsText", default)]
    cms_text: Option<String>,
}

async fn describe_handler<S: StorageTransport + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: axum::body::Bytes,
) -> Response {
    state.requests_served.fetch_add(1, Ordering::Relaxed);

    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return ApiError::from(AltError::new(ErrorCode::InvalidJsonBody, "request body is not valid JSON")).into_response(),
    };

    match value {
        Value::Array(elements) => handle_event_array(&state, elements).await,
        Value::Object(_) => handle_direct_request(&state, value).await,
        _ => ApiError::from(AltError::new(ErrorCode::InvalidJsonBody, "request body must be a JSON array or object")).into_response(),
    }
}

/// Classify the first element of a delivery-service event array and act
/// on it (§4.1): validation handshake, blob-created processing, or a
/// pass-through 202 for anything else.
async fn handle_event_array<S>(state: &Arc<AppState<S>>, elements: Vec<Value>) -> Response
where
    S: StorageTransport + Send + Sync + 'static,
{
    let Some(first) = elements.first() else {
        return ApiError::from(AltError::new(ErrorCode::MissingEventField, "event array is empty")).into_response();
    };

    let event_type = first.get("eventType").and_then(Value::as_str).unwrap_or_default();
    let kind = ImageEvent::kind_from_event_type(event_type);

    match kind {
        EventKind::Validation => {
            let code = first
                .get("data")
                .and_then(|d| d.get("validationCode"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            info!(%code, "subscription validation handshake");
            Json(json!({ "validationResponse": code })).into_response()
        }
        EventKind::BlobCreated => {
            let blob_url = first
                .get("data")
                .and_then(|d| d.get("url"))
                .and_then(Value::as_str);
            let Some(blob_url) = blob_url else {
                return ApiError::from(AltError::new(ErrorCode::MissingEventField, "blob-created event has no url")).into_response();
            };
            let Some((_container, blob_name)) = ImageEvent::split_blob_path(blob_url) else {
                return ApiError::from(AltError::new(ErrorCode::MissingEventField, "blob url has no blob name")).into_response();
            };
            process_blob(state, blob_name, None, None).await
        }
        EventKind::Other => {
            warn!(%event_type, "unrecognized event type; returning pending");
            (StatusCode::ACCEPTED, Json(json!({ "status": "pending" }))).into_response()
        }
    }
}

/// Handle an object body naming `blobName` directly (§4.1's direct-request
/// path), or fall back to a pending acknowledgement when it does not.
async fn handle_direct_request<S>(state: &Arc<AppState<S>>, value: Value) -> Response
where
    S: StorageTransport + Send + Sync + 'static,
{
    let req: DirectDescribeRequest = match serde_json::from_value(value) {
        Ok(req) => req,
        Err(_) => return ApiError::from(AltError::new(ErrorCode::InvalidJsonBody, "malformed describe request")).into_response(),
    };

    let Some(blob_name) = req.blob_name else {
        return (StatusCode::ACCEPTED, Json(json!({ "status": "pending" }))).into_response();
    };

    process_blob(state, blob_name, req.sidecar, req.cms_text).await
}

async fn process_blob<S>(
    state: &Arc<AppState<S>>,
    blob_name: String,
    metadata: Option<alt_core::MetadataDocument>,
    cms_text: Option<String>,
) -> Response
where
    S: StorageTransport + Send + Sync + 'static,
{
    if !is_image_blob(&blob_name) {
        return Json(json!({ "status": "skipped", "reason": "Not an image file", "blob": blob_name })).into_response();
    }

    let input = OrchestratorInput { blob_name: blob_name.clone(), metadata, cms_text };
    match state.orchestrator.run(input).await {
        Ok(output) => Json(json!({
            "status": "processed",
            "blob": blob_name,
            "altText": output.alt_json.alt_text,
            "tags": output.tags.to_map(),
            "copied": output.copied,
        }))
        .into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Names of the delivery-service event types this handler recognizes,
/// re-exported for documentation/testing convenience.
pub const RECOGNIZED_EVENT_TYPES: [&str; 2] = [SUBSCRIPTION_VALIDATION_EVENT, BLOB_CREATED_EVENT];
