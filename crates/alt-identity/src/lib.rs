// SPDX-License-Identifier: MIT OR Apache-2.0
//! Managed-identity bearer token provider and cache (§4.7).
//!
//! [`IdentityTokenProvider::get_token`] canonicalizes the requested audience,
//! consults a concurrent cache keyed by a hash of the canonical audience, and
//! on a miss discovers the identity endpoint from configuration (falling
//! back to the instance-metadata service) to mint a fresh token.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;

use alt_core::TokenCacheEntry;
use alt_error::{AltError, ErrorCode};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

/// Fixed link-local instance-metadata-service endpoint used when no
/// `IDENTITY_ENDPOINT`/`IDENTITY_HEADER` pair is configured (§4.7 step 3).
pub const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// Default token lifetime assumed when the identity endpoint omits
/// `expires_in` (§4.7 step 4).
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// A single query parameter key/value pair.
pub type QueryParam<'a> = (&'a str, &'a str);

/// Minimal response shape returned by [`IdentityTransport::get`].
#[derive(Debug, Clone)]
pub struct IdentityResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

/// Transport abstraction over the identity endpoint, injectable so tests
/// never reach a real IMDS or managed-identity sidecar.
#[async_trait]
pub trait IdentityTransport: Send + Sync {
    /// Issue a GET request with query parameters and headers, returning the
    /// raw response. Transport-level failures (DNS, connect, timeout) should
    /// be mapped to [`AltError`] with [`ErrorCode::IdentityUnavailable`].
    async fn get(
        &self,
        url: &str,
        query: &[QueryParam<'_>],
        headers: &[(&str, &str)],
    ) -> Result<IdentityResponse, AltError>;
}

/// Thread-safe handle to an [`IdentityTransport`] implementation.
pub type DynIdentityTransport = Arc<dyn IdentityTransport>;

#[derive(Debug, Deserialize)]
struct TokenResponseBody {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

// ---------------------------------------------------------------------------
// Endpoint discovery
// ---------------------------------------------------------------------------

/// Where to send the token request, resolved once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    /// A configured managed-identity endpoint with its secret header value
    /// (§4.7 step 3, "if present").
    Configured { url: String, header_value: String },
    /// The fixed IMDS link-local address (§4.7 step 3, "if absent").
    Imds,
}

/// Canonicalize an audience string: strip a trailing `/.default`, then any
/// trailing slashes (§4.7 step 1).
pub fn canonicalize_audience(audience: &str) -> String {
    let stripped = audience.strip_suffix("/.default").unwrap_or(audience);
    stripped.trim_end_matches('/').to_string()
}

/// Hash a canonical audience into the cache key (§4.7 step 2, §5).
fn cache_key(canonical_audience: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_audience.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Caching token provider for one process.
///
/// The cache is a `RwLock`-guarded map (§5: "a simple mutex-guarded map
/// suffices") shared across concurrent requests.
pub struct IdentityTokenProvider {
    transport: DynIdentityTransport,
    identity_endpoint: Option<String>,
    identity_header: Option<String>,
    client_id: Option<String>,
    cache: RwLock<HashMap<String, TokenCacheEntry>>,
}

impl IdentityTokenProvider {
    /// Build a provider from resolved configuration values.
    pub fn new(
        transport: DynIdentityTransport,
        identity_endpoint: Option<String>,
        identity_header: Option<String>,
        client_id: Option<String>,
    ) -> Self {
        Self {
            transport,
            identity_endpoint,
            identity_header,
            client_id,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn endpoint(&self) -> Endpoint {
        match (&self.identity_endpoint, &self.identity_header) {
            (Some(url), Some(header)) => Endpoint::Configured {
                url: url.clone(),
                header_value: header.clone(),
            },
            _ => Endpoint::Imds,
        }
    }

    /// Fetch a bearer token scoped to `audience`, serving a cached value when
    /// still fresh (§4.7).
    pub async fn get_token(&self, audience: &str) -> Result<String, AltError> {
        let canonical = canonicalize_audience(audience);
        let key = cache_key(&canonical);

        if let Some(entry) = self.cache.read().await.get(&key) {
            if entry.is_fresh(Utc::now()) {
                debug!(audience = %canonical, "identity token cache hit");
                return Ok(entry.access_token.clone());
            }
        }

        let entry = self.fetch(&canonical).await?;
        let token = entry.access_token.clone();
        self.cache.write().await.insert(key, entry);
        Ok(token)
    }

    async fn fetch(&self, canonical_audience: &str) -> Result<TokenCacheEntry, AltError> {
        let (url, query, headers) = match self.endpoint() {
            Endpoint::Configured { url, header_value } => {
                let mut query = vec![
                    ("resource", canonical_audience.to_string()),
                    ("api-version", "2019-08-01".to_string()),
                ];
                if let Some(client_id) = &self.client_id {
                    query.push(("client_id", client_id.clone()));
                }
                let headers = vec![
                    ("X-IDENTITY-HEADER".to_string(), header_value),
                    ("Metadata".to_string(), "true".to_string()),
                ];
                (url, query, headers)
            }
            Endpoint::Imds => {
                let query = vec![
                    ("resource", canonical_audience.to_string()),
                    ("api-version", "2018-02-01".to_string()),
                ];
                let headers = vec![("Metadata".to_string(), "true".to_string())];
                (IMDS_ENDPOINT.to_string(), query, headers)
            }
        };

        let query_refs: Vec<QueryParam<'_>> =
            query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let header_refs: Vec<(&str, &str)> =
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let response = self.transport.get(&url, &query_refs, &header_refs).await?;

        if response.status < 200 || response.status >= 300 {
            return Err(AltError::new(
                ErrorCode::IdentityUnavailable,
                format!("identity endpoint returned status {}", response.status),
            )
            .with_context("audience", canonical_audience));
        }

        let body: TokenResponseBody = serde_json::from_slice(&response.body).map_err(|e| {
            AltError::new(ErrorCode::IdentityUnavailable, "malformed token response")
                .with_source(e)
        })?;

        let expires_in = body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        debug!(
            audience = %canonical_audience,
            token_preview = %token_preview(&body.access_token),
            "identity token acquired"
        );

        Ok(TokenCacheEntry {
            access_token: body.access_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}

/// First/last few characters only — tokens are never logged in full (§4.7).
fn token_preview(token: &str) -> String {
    if token.len() <= 8 {
        return "***".to_string();
    }
    format!("{}...{}", &token[..4], &token[token.len() - 4..])
}
