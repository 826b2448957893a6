// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end coverage of `POST /describe` and `POST /login` against an
//! in-process router backed by fake transports (§8).

use alt_core::{DescriberResult, MetadataDocument, ProductFacts, VisionHints};
use alt_daemon::{build_app, AppState};
use alt_describe::Describer;
use alt_error::AltError;
use alt_identity::{DynIdentityTransport, IdentityResponse, IdentityTokenProvider, IdentityTransport, QueryParam};
use alt_orchestrator::PipelineOrchestrator;
use alt_storage::{ObjectStoreClient, StorageMethod, StorageRequest, StorageResponse, StorageTransport};
use alt_translate::Translator;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct FakeIdentityTransport;

#[async_trait]
impl IdentityTransport for FakeIdentityTransport {
    async fn get(&self, _url: &str, _query: &[QueryParam<'_>], _headers: &[(&str, &str)]) -> Result<IdentityResponse, AltError> {
        let body = serde_json::json!({"access_token": "tok", "expires_in": 3600});
        Ok(IdentityResponse { status: 200, body: serde_json::to_vec(&body).unwrap() })
    }
}

fn identity() -> Arc<IdentityTokenProvider> {
    let transport: DynIdentityTransport = Arc::new(FakeIdentityTransport);
    Arc::new(IdentityTokenProvider::new(transport, None, None, None))
}

struct FakeStorage {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl FakeStorage {
    fn with_image(path: &str, bytes: &[u8]) -> Self {
        let mut blobs = BTreeMap::new();
        blobs.insert(path.to_string(), bytes.to_vec());
        Self { blobs: Mutex::new(blobs) }
    }
}

#[async_trait]
impl StorageTransport for FakeStorage {
    async fn execute(&self, request: StorageRequest) -> Result<StorageResponse, AltError> {
        let key = request.url.split('/').skip(3).collect::<Vec<_>>().join("/");
        let key = key.split('?').next().unwrap_or(&key).to_string();
        match request.method {
            StorageMethod::Get => match self.blobs.lock().unwrap().get(&key) {
                Some(bytes) => Ok(StorageResponse { status: 200, body: bytes.clone() }),
                None => Ok(StorageResponse { status: 404, body: vec![] }),
            },
            StorageMethod::Put => Ok(StorageResponse { status: 201, body: vec![] }),
        }
    }
}

struct FakeDescriber;

#[async_trait]
impl Describer for FakeDescriber {
    async fn describe(
        &self,
        _blob_name: &str,
        _image_ref: &str,
        _metadata: &MetadataDocument,
        _facts: &ProductFacts,
        _hints: &VisionHints,
        _token: &str,
    ) -> Result<DescriberResult, AltError> {
        Ok(DescriberResult::new("A printer.".to_string()))
    }
}

struct FakeTranslator;

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(
        &self,
        text: &str,
        languages: &[String],
        _metadata: &MetadataDocument,
        _token: &str,
    ) -> Result<BTreeMap<String, String>, AltError> {
        let mut out = BTreeMap::new();
        for lang in languages {
            out.insert(lang.clone(), format!("[{lang}] {text}"));
        }
        Ok(out)
    }
}

fn app(storage: FakeStorage) -> axum::Router {
    let orchestrator = PipelineOrchestrator::new(
        ObjectStoreClient::new(storage, "acct"),
        identity(),
        Arc::new(FakeDescriber),
        Arc::new(FakeTranslator),
        "ingest",
        "public",
    );
    build_app(Arc::new(AppState::new(orchestrator)))
}

async fn post(app: axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_reports_ok_with_uptime() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let resp = app.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json.get("uptime_seconds").is_some());
}

#[tokio::test]
async fn validation_handshake_echoes_the_code_with_no_side_effects() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let body = serde_json::json!([{
        "eventType": "Microsoft.EventGrid.SubscriptionValidationEvent",
        "data": {"validationCode": "abc-123"},
    }]);
    let (status, json) = post(app, "/describe", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["validationResponse"], "abc-123");
}

#[tokio::test]
async fn blob_created_event_processes_the_image_end_to_end() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let body = serde_json::json!([{
        "eventType": "Microsoft.Storage.BlobCreated",
        "data": {"url": "https://acct.blob.core.windows.net/ingest/img_0.png"},
    }]);
    let (status, json) = post(app, "/describe", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "processed");
    assert_eq!(json["altText"]["en"], "A printer.");
}

#[tokio::test]
async fn blob_created_event_for_a_non_image_is_skipped() {
    let app = app(FakeStorage::with_image("ingest/notes.txt", b"hi"));
    let body = serde_json::json!([{
        "eventType": "Microsoft.Storage.BlobCreated",
        "data": {"url": "https://acct.blob.core.windows.net/ingest/notes.txt"},
    }]);
    let (status, json) = post(app, "/describe", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "skipped");
}

#[tokio::test]
async fn unrecognized_event_type_returns_pending() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let body = serde_json::json!([{"eventType": "Microsoft.Storage.BlobDeleted", "data": {}}]);
    let (status, json) = post(app, "/describe", body).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["status"], "pending");
}

#[tokio::test]
async fn direct_request_with_blob_name_processes_the_image() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let body = serde_json::json!({
        "blobName": "img_0.png",
        "cmsText": "Color: Black",
    });
    let (status, json) = post(app, "/describe", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "processed");
}

#[tokio::test]
async fn direct_request_with_sidecar_metadata_honors_requested_languages() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let body = serde_json::json!({
        "blobName": "img_0.png",
        "sidecar": {"languages": ["en", "jp"]},
    });
    let (status, json) = post(app, "/describe", body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["altText"].get("jp").is_some());
}

#[tokio::test]
async fn object_body_without_blob_name_returns_pending() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let (status, json) = post(app, "/describe", serde_json::json!({"foo": "bar"})).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["status"], "pending");
}

#[tokio::test]
async fn malformed_json_body_returns_400() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/describe")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_image_blob_surfaces_as_a_500() {
    let app = app(FakeStorage::with_image("ingest/other.png", b"\x89PNG"));
    let body = serde_json::json!({"blobName": "img_0.png"});
    let (status, _json) = post(app, "/describe", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn login_issues_an_opaque_session_token() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let body = serde_json::json!({"tenant_id": "acme", "user_id": "u1"});
    let (status, json) = post(app, "/login", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tenant_id"], "acme");
    assert_eq!(json["expires_in"], 3600);
    assert!(json["session_token"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn login_with_empty_body_still_succeeds() {
    let app = app(FakeStorage::with_image("ingest/img_0.png", b"\x89PNG"));
    let resp = app
        .oneshot(Request::builder().method("POST").uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
