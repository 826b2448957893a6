//! Injectable HTTP transport for describer variants.

use alt_error::AltError;
use async_trait::async_trait;

/// HTTP method used by a describer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriberMethod {
    /// Read-only call (used by the caption+tags variant).
    Get,
    /// Chat-completion call.
    Post,
}

/// A fully-addressed request to a describer endpoint.
#[derive(Debug, Clone)]
pub struct DescriberRequest {
    /// HTTP method.
    pub method: DescriberMethod,
    /// Fully-qualified URL, including any query string.
    pub url: String,
    /// Request headers, already including auth.
    pub headers: Vec<(String, String)>,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

/// Response from a describer endpoint.
#[derive(Debug, Clone)]
pub struct DescriberResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Transport abstraction over describer endpoints, injectable so tests run
/// against an in-memory fake instead of a live model deployment.
#[async_trait]
pub trait DescriberTransport: Send + Sync {
    /// Execute one describer request.
    async fn execute(&self, request: DescriberRequest) -> Result<DescriberResponse, AltError>;
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
