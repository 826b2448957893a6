// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unified error taxonomy with stable error codes for the alt-text pipeline
//! (§7).
//!
//! Every [`AltError`] carries an [`ErrorCode`] (a machine-readable, stable
//! string tag), a human-readable message, an optional cause chain, and
//! arbitrary key-value context. Use [`AltError::new`] to build one fluently.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family an [`ErrorCode`] belongs to, mirroring §7's taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The inbound request body was malformed or missing required fields.
    MalformedInput,
    /// An upstream dependency returned a 5xx, timed out, or reset the connection.
    TransientRemote,
    /// An upstream dependency returned a 4xx or rejected authentication.
    PermanentRemote,
    /// Bearer token acquisition failed.
    TokenAcquisition,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MalformedInput => "malformed_input",
            Self::TransientRemote => "transient_remote",
            Self::PermanentRemote => "permanent_remote",
            Self::TokenAcquisition => "token_acquisition",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serializes to a `SCREAMING_SNAKE_CASE` string guaranteed not
/// to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The webhook body was not valid JSON.
    InvalidJsonBody,
    /// A required event field was missing (e.g. no blob URL on a blob-created event).
    MissingEventField,
    /// The describer call failed (non-2xx, timeout, or connection error).
    DescriberUnavailable,
    /// The translator call failed for every requested language.
    TranslatorUnavailable,
    /// The object store rejected a read, write, or copy operation.
    StorageUnavailable,
    /// The identity endpoint could not be reached or returned an error.
    IdentityUnavailable,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidJsonBody | Self::MissingEventField => ErrorCategory::MalformedInput,
            Self::DescriberUnavailable
            | Self::TranslatorUnavailable
            | Self::StorageUnavailable => ErrorCategory::TransientRemote,
            Self::IdentityUnavailable => ErrorCategory::TokenAcquisition,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation (e.g. `"INVALID_JSON_BODY"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidJsonBody => "INVALID_JSON_BODY",
            Self::MissingEventField => "MISSING_EVENT_FIELD",
            Self::DescriberUnavailable => "DESCRIBER_UNAVAILABLE",
            Self::TranslatorUnavailable => "TRANSLATOR_UNAVAILABLE",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::IdentityUnavailable => "IDENTITY_UNAVAILABLE",
            Self::Internal => "INTERNAL",
        }
    }

    /// The HTTP status the daemon should surface for this code (§7).
    pub fn http_status(&self) -> u16 {
        match self.category() {
            ErrorCategory::MalformedInput => 400,
            ErrorCategory::TransientRemote
            | ErrorCategory::PermanentRemote
            | ErrorCategory::TokenAcquisition
            | ErrorCategory::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AltError
// ---------------------------------------------------------------------------

/// Unified pipeline error.
///
/// ```
/// use alt_error::{AltError, ErrorCode};
///
/// let err = AltError::new(ErrorCode::DescriberUnavailable, "timed out after 60s")
///     .with_context("blob", "img_0.png");
/// assert_eq!(err.code.http_status(), 500);
/// ```
pub struct AltError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl AltError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; serialization
    /// failures are silently skipped rather than panicking.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl fmt::Debug for AltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("AltError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for AltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AltError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// The body shape the HTTP handler serializes an [`AltError`] into (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code string.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&AltError> for ErrorBody {
    fn from(err: &AltError) -> Self {
        Self {
            error: err.code.as_str().to_string(),
            message: err.message.clone(),
        }
    }
}
