// SPDX-License-Identifier: MIT OR Apache-2.0
//! Describer result shapes (§3 `DescriberResult`).

use serde::{Deserialize, Serialize};

/// Token usage reported by a chat-completion style endpoint, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens consumed by the completion.
    pub completion_tokens: u32,
}

/// The result of describing one image in English.
///
/// An empty `alt_en` signals failure; callers treat it as an error rather
/// than persisting it (§3 invariant).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriberResult {
    /// The normalized English alt text, or empty on failure.
    pub alt_en: String,
    /// Optional token-usage accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl DescriberResult {
    /// Construct a successful result with no usage accounting.
    pub fn new(alt_en: impl Into<String>) -> Self {
        Self {
            alt_en: alt_en.into(),
            usage: None,
        }
    }

    /// The empty/failure result.
    pub fn failed() -> Self {
        Self::default()
    }

    /// Whether this result represents a failure to describe the image.
    pub fn is_failure(&self) -> bool {
        self.alt_en.is_empty()
    }
}
