// SPDX-License-Identifier: MIT OR Apache-2.0
//! `Describer` trait and its three variants (§4.5).
//!
//! [`MultimodalDescriber`] is the primary variant backing both the `slm` and
//! `llm` strategies. [`CaptionTagsDescriber`] and [`Phi4Describer`] are
//! alternate variants used when the multimodal chat endpoint is unavailable
//! or unsupported.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Chat-completion wire message shapes.
pub mod message;
/// User instruction composition.
pub mod instruction;
/// Injectable HTTP transport.
pub mod transport;
/// Primary multimodal chat-completion variant.
pub mod multimodal;
/// Caption+tags vision API variant.
pub mod vision;
/// Text-chat-with-inline-image-url variant.
pub mod phi4;

use alt_core::{DescriberResult, MetadataDocument, ProductFacts, VisionHints};
use alt_error::AltError;
use async_trait::async_trait;

pub use multimodal::MultimodalDescriber;
pub use phi4::Phi4Describer;
pub use transport::{DescriberMethod, DescriberRequest, DescriberResponse, DescriberTransport};
pub use vision::CaptionTagsDescriber;

/// Produces an English alt-text description of one product image (§4.5).
///
/// Per §4.5's failure policy, a non-2xx HTTP response or unparseable body
/// yields `Ok(DescriberResult::failed())`, not an `Err` — only transport-level
/// failures (connection errors, timeouts) propagate as [`AltError`].
#[async_trait]
pub trait Describer: Send + Sync {
    /// Describe `blob_name`, whose image bytes are referenced by `image_ref`
    /// (typically a `data:` URL), using `metadata`/`facts`/`hints` as
    /// context and `token` as the bearer credential.
    async fn describe(
        &self,
        blob_name: &str,
        image_ref: &str,
        metadata: &MetadataDocument,
        facts: &ProductFacts,
        hints: &VisionHints,
        token: &str,
    ) -> Result<DescriberResult, AltError>;
}
