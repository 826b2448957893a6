// SPDX-License-Identifier: MIT OR Apache-2.0
//! `reqwest`-backed implementations of the injectable transport traits used
//! by `alt-identity`, `alt-storage`, `alt-describe`, and `alt-translate`.
//!
//! Timeouts follow §5: 30s for read/write/copy and describer/translator
//! calls, 15s for tag operations — the only request shape where the two
//! diverge is the storage `PUT …?comp=tags` call.

use std::time::Duration;

use alt_describe::{DescriberMethod, DescriberRequest, DescriberResponse, DescriberTransport};
use alt_error::{AltError, ErrorCode};
use alt_identity::{IdentityResponse, IdentityTransport, QueryParam};
use alt_storage::{StorageMethod, StorageRequest, StorageResponse, StorageTransport};
use alt_translate::{TranslatorMethod, TranslatorRequest, TranslatorResponse, TranslatorTransport};
use async_trait::async_trait;
use reqwest::Client;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const TAG_TIMEOUT: Duration = Duration::from_secs(15);

fn transport_error(err: reqwest::Error) -> AltError {
    AltError::new(ErrorCode::StorageUnavailable, format!("request failed: {err}"))
}

/// Shared `reqwest` client used by every production transport.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build the shared client, failing only if the TLS backend can't
    /// initialize (§5).
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self { client: Client::builder().build()? })
    }
}

/// [`IdentityTransport`] backed by `reqwest`, talking to IMDS or a
/// configured managed-identity endpoint.
pub struct ReqwestIdentityTransport(pub HttpClient);

#[async_trait]
impl IdentityTransport for ReqwestIdentityTransport {
    async fn get(
        &self,
        url: &str,
        query: &[QueryParam<'_>],
        headers: &[(&str, &str)],
    ) -> Result<IdentityResponse, AltError> {
        let mut request = self.0.client.get(url).timeout(DEFAULT_TIMEOUT);
        for (key, value) in query {
            request = request.query(&[(*key, *value)]);
        }
        for (key, value) in headers {
            request = request.header(*key, *value);
        }
        let response = request.send().await.map_err(|err| {
            AltError::new(ErrorCode::IdentityUnavailable, format!("identity request failed: {err}"))
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|err| {
            AltError::new(ErrorCode::IdentityUnavailable, format!("identity response read failed: {err}"))
        })?;
        Ok(IdentityResponse { status, body: body.to_vec() })
    }
}

/// [`StorageTransport`] backed by `reqwest`, talking to the object store's
/// REST endpoint.
pub struct ReqwestStorageTransport(pub HttpClient);

#[async_trait]
impl StorageTransport for ReqwestStorageTransport {
    async fn execute(&self, request: StorageRequest) -> Result<StorageResponse, AltError> {
        let timeout = if request.url.contains("comp=tags") { TAG_TIMEOUT } else { DEFAULT_TIMEOUT };
        let method = match request.method {
            StorageMethod::Get => reqwest::Method::GET,
            StorageMethod::Put => reqwest::Method::PUT,
        };
        let mut builder = self.0.client.request(method, &request.url).timeout(timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(StorageResponse { status, body: body.to_vec() })
    }
}

/// [`DescriberTransport`] backed by `reqwest`, talking to the model
/// deployment's chat-completion or vision endpoint.
pub struct ReqwestDescriberTransport(pub HttpClient);

#[async_trait]
impl DescriberTransport for ReqwestDescriberTransport {
    async fn execute(&self, request: DescriberRequest) -> Result<DescriberResponse, AltError> {
        let method = match request.method {
            DescriberMethod::Get => reqwest::Method::GET,
            DescriberMethod::Post => reqwest::Method::POST,
        };
        let mut builder = self.0.client.request(method, &request.url).timeout(DEFAULT_TIMEOUT);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.header("Content-Type", "application/json").body(body);
        }
        let response = builder.send().await.map_err(|err| {
            AltError::new(ErrorCode::DescriberUnavailable, format!("describer request failed: {err}"))
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|err| {
            AltError::new(ErrorCode::DescriberUnavailable, format!("describer response read failed: {err}"))
        })?;
        Ok(DescriberResponse { status, body: body.to_vec() })
    }
}

/// [`TranslatorTransport`] backed by `reqwest`, talking to either the
/// dedicated translation API or a chat-completion deployment.
pub struct ReqwestTranslatorTransport(pub HttpClient);

#[async_trait]
impl TranslatorTransport for ReqwestTranslatorTransport {
    async fn execute(&self, request: TranslatorRequest) -> Result<TranslatorResponse, AltError> {
        let method = match request.method {
            TranslatorMethod::Post => reqwest::Method::POST,
        };
        let mut builder = self.0.client.request(method, &request.url).timeout(DEFAULT_TIMEOUT);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.header("Content-Type", "application/json").body(body);
        }
        let response = builder.send().await.map_err(|err| {
            AltError::new(ErrorCode::TranslatorUnavailable, format!("translator request failed: {err}"))
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|err| {
            AltError::new(ErrorCode::TranslatorUnavailable, format!("translator response read failed: {err}"))
        })?;
        Ok(TranslatorResponse { status, body: body.to_vec() })
    }
}
