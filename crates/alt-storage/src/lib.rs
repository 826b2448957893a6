// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object store client (§4.8).
//!
//! All operations are authenticated by a caller-supplied bearer token (the
//! orchestrator obtains one from `alt-identity` before calling in) and send
//! the fixed `x-ms-version: 2021-08-06` header. Timeouts are the caller's
//! responsibility (§5: 30s for read/write/copy, 15s for tag operations) —
//! this crate's [`StorageTransport`] is where that policy is enforced by the
//! concrete `reqwest`-backed implementation.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeMap;

use alt_core::MetadataDocument;
use alt_error::{AltError, ErrorCode};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::warn;

/// Storage protocol version sent with every request (§4.8).
pub const STORAGE_API_VERSION: &str = "2021-08-06";

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// HTTP method used by a storage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMethod {
    /// Read a blob.
    Get,
    /// Write, tag, or copy a blob.
    Put,
}

/// A request to the object store transport, already fully addressed.
#[derive(Debug, Clone)]
pub struct StorageRequest {
    /// HTTP method.
    pub method: StorageMethod,
    /// Fully-qualified URL, including any query string.
    pub url: String,
    /// Request headers, already including auth and `x-ms-version`.
    pub headers: Vec<(String, String)>,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

/// Response from the object store transport.
#[derive(Debug, Clone)]
pub struct StorageResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Transport abstraction over the object store, injectable so tests run
/// against an in-memory fake instead of a live account.
#[async_trait]
pub trait StorageTransport: Send + Sync {
    /// Execute one storage request.
    async fn execute(&self, request: StorageRequest) -> Result<StorageResponse, AltError>;
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

// ---------------------------------------------------------------------------
// Mime lookup (§4.8 dataUrl)
// ---------------------------------------------------------------------------

/// Mime type for a blob extension, per the §4.8 table. Unknown extensions
/// fall back to `application/octet-stream`.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Object store client addressed at one storage account.
pub struct ObjectStoreClient<T: StorageTransport> {
    transport: T,
    account: String,
}

impl<T: StorageTransport> ObjectStoreClient<T> {
    /// Build a client for the given storage account (e.g. `mystorageacct`);
    /// blob endpoints are constructed as
    /// `https://<account>.blob.core.windows.net/<container>/<blob>`.
    pub fn new(transport: T, account: impl Into<String>) -> Self {
        Self {
            transport,
            account: account.into(),
        }
    }

    fn blob_url(&self, container: &str, blob: &str) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}/{}",
            self.account, container, blob
        )
    }

    fn auth_headers(&self, token: &str) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), format!("Bearer {token}")),
            ("x-ms-version".to_string(), STORAGE_API_VERSION.to_string()),
        ]
    }

    /// Read a blob's bytes. A 404 yields `Ok(None)`; any other non-2xx is an
    /// error (§4.8 `read`).
    pub async fn read(
        &self,
        container: &str,
        blob: &str,
        token: &str,
    ) -> Result<Option<Vec<u8>>, AltError> {
        let response = self
            .transport
            .execute(StorageRequest {
                method: StorageMethod::Get,
                url: self.blob_url(container, blob),
                headers: self.auth_headers(token),
                body: None,
            })
            .await?;

        if response.status == 404 {
            return Ok(None);
        }
        if !is_success(response.status) {
            return Err(AltError::new(
                ErrorCode::StorageUnavailable,
                format!("read failed with status {}", response.status),
            )
            .with_context("container", container)
            .with_context("blob", blob));
        }
        Ok(Some(response.body))
    }

    /// Write a blob's bytes with the given content type (§4.8 `write`).
    pub async fn write(
        &self,
        container: &str,
        blob: &str,
        bytes: Vec<u8>,
        content_type: &str,
        token: &str,
    ) -> Result<(), AltError> {
        let mut headers = self.auth_headers(token);
        headers.push(("x-ms-blob-type".to_string(), "BlockBlob".to_string()));
        headers.push(("Content-Length".to_string(), bytes.len().to_string()));
        headers.push(("Content-Type".to_string(), content_type.to_string()));

        let response = self
            .transport
            .execute(StorageRequest {
                method: StorageMethod::Put,
                url: self.blob_url(container, blob),
                headers,
                body: Some(bytes),
            })
            .await?;

        if !is_success(response.status) {
            return Err(AltError::new(
                ErrorCode::StorageUnavailable,
                format!("write failed with status {}", response.status),
            )
            .with_context("container", container)
            .with_context("blob", blob));
        }
        Ok(())
    }

    /// Set blob index tags. Non-2xx is logged and swallowed — tag writes are
    /// non-fatal (§4.8 `setTags`, §4.2 step 10 failure policy).
    pub async fn set_tags(&self, container: &str, blob: &str, tags: &BTreeMap<String, String>, token: &str) {
        let url = format!("{}?comp=tags", self.blob_url(container, blob));
        let body = tags_xml(tags);
        let mut headers = self.auth_headers(token);
        headers.push(("Content-Type".to_string(), "application/xml".to_string()));
        headers.push(("Content-Length".to_string(), body.len().to_string()));

        let result = self
            .transport
            .execute(StorageRequest {
                method: StorageMethod::Put,
                url,
                headers,
                body: Some(body.into_bytes()),
            })
            .await;

        match result {
            Ok(response) if is_success(response.status) => {}
            Ok(response) => warn!(
                container, blob, status = response.status,
                "setTags returned non-2xx; continuing (non-fatal)"
            ),
            Err(err) => warn!(container, blob, %err, "setTags request failed; continuing (non-fatal)"),
        }
    }

    /// Copy a blob from one container/name to another (§4.8 `copy`).
    pub async fn copy(
        &self,
        src_container: &str,
        src_blob: &str,
        dst_container: &str,
        dst_blob: &str,
        token: &str,
    ) -> Result<(), AltError> {
        let src_url = self.blob_url(src_container, src_blob);
        let mut headers = self.auth_headers(token);
        headers.push(("x-ms-copy-source".to_string(), src_url));

        let response = self
            .transport
            .execute(StorageRequest {
                method: StorageMethod::Put,
                url: self.blob_url(dst_container, dst_blob),
                headers,
                body: None,
            })
            .await?;

        if !is_success(response.status) {
            return Err(AltError::new(
                ErrorCode::StorageUnavailable,
                format!("copy failed with status {}", response.status),
            )
            .with_context("src_blob", src_blob)
            .with_context("dst_blob", dst_blob));
        }
        Ok(())
    }

    /// Read a blob and return it as a `data:<mime>;base64,<…>` URL, or `None`
    /// if the blob doesn't exist (§4.8 `dataUrl`).
    pub async fn data_url(
        &self,
        container: &str,
        blob: &str,
        token: &str,
    ) -> Result<Option<String>, AltError> {
        let bytes = match self.read(container, blob, token).await? {
            Some(b) => b,
            None => return Ok(None),
        };
        let extension = alt_core::extension_of(blob).unwrap_or("");
        let mime = mime_for_extension(extension);
        let encoded = BASE64.encode(&bytes);
        Ok(Some(format!("data:{mime};base64,{encoded}")))
    }

    /// Read and parse `<stem>.yml` for a blob name as a [`MetadataDocument`],
    /// returning `None` when the document is absent (§4.8 `readYamlMetadata`).
    /// Malformed documents are also treated as absent (§3's "absent or
    /// malformed" invariant) rather than propagated as errors.
    pub async fn read_yaml_metadata(
        &self,
        container: &str,
        blob_name: &str,
        token: &str,
    ) -> Result<Option<MetadataDocument>, AltError> {
        let yml_name = format!("{}.yml", alt_core::stem_of(blob_name));
        let bytes = match self.read(container, &yml_name, token).await? {
            Some(b) => b,
            None => return Ok(None),
        };
        match serde_yaml::from_slice::<MetadataDocument>(&bytes) {
            Ok(doc) => Ok(Some(doc)),
            Err(err) => {
                warn!(container, blob = %yml_name, %err, "malformed yaml metadata; proceeding without it");
                Ok(None)
            }
        }
    }
}

fn tags_xml(tags: &BTreeMap<String, String>) -> String {
    let mut body = String::from("<Tags><TagSet>");
    for (k, v) in tags {
        body.push_str(&format!(
            "<Tag><Key>{}</Key><Value>{}</Value></Tag>",
            xml_escape(k),
            xml_escape(v)
        ));
    }
    body.push_str("</TagSet></Tags>");
    body
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeTransport {
        blobs: Mutex<BTreeMap<String, Vec<u8>>>,
        requests: Mutex<Vec<StorageRequest>>,
        force_status: Option<u16>,
    }

    impl FakeTransport {
        fn new() -> Self {
            Self {
                blobs: Mutex::new(BTreeMap::new()),
                requests: Mutex::new(Vec::new()),
                force_status: None,
            }
        }

        fn with_blob(self, url_suffix: &str, bytes: &[u8]) -> Self {
            self.blobs
                .lock()
                .unwrap()
                .insert(url_suffix.to_string(), bytes.to_vec());
            self
        }
    }

    #[async_trait]
    impl StorageTransport for FakeTransport {
        async fn execute(&self, request: StorageRequest) -> Result<StorageResponse, AltError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(status) = self.force_status {
                return Ok(StorageResponse { status, body: vec![] });
            }
            match request.method {
                StorageMethod::Get => {
                    let key = request.url.split('/').skip(3).collect::<Vec<_>>().join("/");
                    let key = key.split('?').next().unwrap_or(&key).to_string();
                    match self.blobs.lock().unwrap().get(&key) {
                        Some(bytes) => Ok(StorageResponse { status: 200, body: bytes.clone() }),
                        None => Ok(StorageResponse { status: 404, body: vec![] }),
                    }
                }
                StorageMethod::Put => Ok(StorageResponse { status: 201, body: vec![] }),
            }
        }
    }

    fn client(transport: FakeTransport) -> ObjectStoreClient<FakeTransport> {
        ObjectStoreClient::new(transport, "acct")
    }

    #[tokio::test]
    async fn read_returns_none_on_404() {
        let c = client(FakeTransport::new());
        let result = c.read("ingest", "missing.png", "tok").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn read_returns_bytes_on_200() {
        let c = client(FakeTransport::new().with_blob("ingest/img.png", b"hello"));
        let result = c.read("ingest", "img.png", "tok").await.unwrap();
        assert_eq!(result, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn read_errors_on_non_2xx_non_404() {
        let mut transport = FakeTransport::new();
        transport.force_status = Some(500);
        let c = client(transport);
        let err = c.read("ingest", "img.png", "tok").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageUnavailable);
    }

    #[tokio::test]
    async fn write_sends_block_blob_headers() {
        let c = client(FakeTransport::new());
        c.write("public", "img.png", b"data".to_vec(), "image/png", "tok")
            .await
            .unwrap();
        let requests = c.transport.requests.lock().unwrap();
        let req = &requests[0];
        assert!(req.headers.iter().any(|(k, v)| k == "x-ms-blob-type" && v == "BlockBlob"));
        assert!(req.headers.iter().any(|(k, v)| k == "Content-Type" && v == "image/png"));
    }

    #[tokio::test]
    async fn set_tags_never_propagates_an_error() {
        let mut transport = FakeTransport::new();
        transport.force_status = Some(503);
        let c = client(transport);
        let mut tags = BTreeMap::new();
        tags.insert("processed".to_string(), "true".to_string());
        c.set_tags("public", "img.png", &tags, "tok").await;
    }

    #[tokio::test]
    async fn set_tags_serializes_xml_tag_set() {
        let c = client(FakeTransport::new());
        let mut tags = BTreeMap::new();
        tags.insert("alt.v".to_string(), "1".to_string());
        c.set_tags("public", "img.png", &tags, "tok").await;
        let requests = c.transport.requests.lock().unwrap();
        let body = String::from_utf8(requests[0].body.clone().unwrap()).unwrap();
        assert!(body.contains("<Key>alt.v</Key><Value>1</Value>"));
    }

    #[tokio::test]
    async fn copy_attaches_absolute_source_url_header() {
        let c = client(FakeTransport::new());
        c.copy("ingest", "img.png", "public", "img.png", "tok")
            .await
            .unwrap();
        let requests = c.transport.requests.lock().unwrap();
        let header = requests[0]
            .headers
            .iter()
            .find(|(k, _)| k == "x-ms-copy-source")
            .unwrap();
        assert!(header.1.starts_with("https://acct.blob.core.windows.net/ingest/img.png"));
    }

    #[tokio::test]
    async fn data_url_encodes_base64_with_detected_mime() {
        let c = client(FakeTransport::new().with_blob("ingest/img.png", b"\x89PNG"));
        let url = c.data_url("ingest", "img.png", "tok").await.unwrap().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn data_url_is_none_when_blob_missing() {
        let c = client(FakeTransport::new());
        assert!(c.data_url("ingest", "missing.png", "tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_yaml_metadata_parses_the_stem_yml_sibling() {
        let yaml = b"brand: Acme\nmodel: X1\nlanguages:\n  - en\n  - jp\n" as &[u8];
        let c = client(FakeTransport::new().with_blob("ingest/img_0.yml", yaml));
        let doc = c
            .read_yaml_metadata("ingest", "img_0.png", "tok")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.brand.as_deref(), Some("Acme"));
        assert_eq!(doc.languages, vec!["en".to_string(), "jp".to_string()]);
    }

    #[tokio::test]
    async fn read_yaml_metadata_is_none_when_sibling_missing() {
        let c = client(FakeTransport::new());
        assert!(c
            .read_yaml_metadata("ingest", "img_0.png", "tok")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn read_yaml_metadata_treats_malformed_yaml_as_absent() {
        let c = client(FakeTransport::new().with_blob("ingest/img_0.yml", b"not: valid: yaml: ["));
        let doc = c.read_yaml_metadata("ingest", "img_0.png", "tok").await.unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn mime_lookup_matches_the_spec_table() {
        assert_eq!(mime_for_extension("png"), "image/png");
        assert_eq!(mime_for_extension("JPG"), "image/jpeg");
        assert_eq!(mime_for_extension("jpeg"), "image/jpeg");
        assert_eq!(mime_for_extension("gif"), "image/gif");
        assert_eq!(mime_for_extension("webp"), "image/webp");
        assert_eq!(mime_for_extension("bmp"), "application/octet-stream");
    }

    #[test]
    fn xml_escape_handles_reserved_characters() {
        assert_eq!(xml_escape("a&b<c>\"d\""), "a&amp;b&lt;c&gt;&quot;d&quot;");
    }
}
