// SPDX-License-Identifier: MIT OR Apache-2.0
//! `Translator` trait and its two variants (§4.9).
//!
//! [`DedicatedTranslator`] is the primary variant, backed by a standalone
//! translation API. [`ChatCompletionTranslator`] is the alternate variant,
//! driving translation through a chat-completion endpoint one language at a
//! time. Both never fail the whole batch: a per-language error falls back to
//! the English source text for that language (§4.9, §7).
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Non-standard language-code aliasing to the translation API's codes.
pub mod alias;
/// Primary variant: dedicated translation API.
pub mod dedicated;
/// Alternate variant: chat-completion-driven translation.
pub mod chat;
/// Injectable HTTP transport.
pub mod transport;

use std::collections::BTreeMap;

use alt_core::MetadataDocument;
use alt_error::AltError;
use async_trait::async_trait;

pub use chat::ChatCompletionTranslator;
pub use dedicated::DedicatedTranslator;
pub use transport::{TranslatorMethod, TranslatorRequest, TranslatorResponse, TranslatorTransport};

/// Translates English alt text into a requested set of target languages
/// (§4.9).
///
/// Per §7's per-language fallback policy, an individual language's failure
/// never fails the whole call — only a transport-level error (connection
/// reset, timeout) that would prevent *any* progress propagates as
/// [`AltError`].
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` (English) into each of `languages` (lower-case
    /// two-letter codes, possibly aliased, excluding `"en"`), returning a
    /// map keyed by the *requested* code (not the API's mapped code).
    /// `metadata` is available for variants that need brand/model context
    /// (§4.9 "Alternate variant").
    async fn translate(
        &self,
        text: &str,
        languages: &[String],
        metadata: &MetadataDocument,
        token: &str,
    ) -> Result<BTreeMap<String, String>, AltError>;
}
