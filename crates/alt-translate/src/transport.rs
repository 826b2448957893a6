//! Injectable HTTP transport for translator variants.

use alt_error::AltError;
use async_trait::async_trait;

/// HTTP method used by a translator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorMethod {
    /// The dedicated translation API call.
    Post,
}

/// A fully-addressed request to a translator endpoint.
#[derive(Debug, Clone)]
pub struct TranslatorRequest {
    /// HTTP method.
    pub method: TranslatorMethod,
    /// Fully-qualified URL, including any query string.
    pub url: String,
    /// Request headers, already including auth.
    pub headers: Vec<(String, String)>,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

/// Response from a translator endpoint.
#[derive(Debug, Clone)]
pub struct TranslatorResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Transport abstraction over translator endpoints, injectable so tests run
/// against an in-memory fake instead of a live endpoint.
#[async_trait]
pub trait TranslatorTransport: Send + Sync {
    /// Execute one translator request.
    async fn execute(&self, request: TranslatorRequest) -> Result<TranslatorResponse, AltError>;
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
