// SPDX-License-Identifier: MIT OR Apache-2.0
//! alt-core
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! The stable data model for the alt-text pipeline: the shapes that cross
//! crate boundaries between the event handler, the orchestrator, and the
//! describer/translator strategies.

/// Inbound delivery-service event shapes.
pub mod event;
/// Per-image metadata document and derived product facts / vision hints.
pub mod metadata;
/// Describer and translator result shapes.
pub mod describe;
/// The persisted alt-text sidecar and blob tag set.
pub mod result;
/// Identity-provider token cache entry.
pub mod token;

pub use describe::{DescriberResult, TokenUsage};
pub use event::{EventKind, ImageEvent};
pub use metadata::{Angle, MetadataDocument, ProductFacts, VisionHints};
pub use result::{AltTextResult, TagSet};
pub use token::TokenCacheEntry;

/// Image filename extensions (lower-case, no dot) the pipeline will process.
///
/// Anything else triggers the non-image skip path (§4.1).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Returns `true` if `blob_name`'s extension (case-insensitive) is one of
/// [`IMAGE_EXTENSIONS`].
pub fn is_image_blob(blob_name: &str) -> bool {
    extension_of(blob_name)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Returns the lower-case extension (without the leading dot) of `blob_name`,
/// or `None` if there isn't one.
pub fn extension_of(blob_name: &str) -> Option<&str> {
    blob_name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Returns `blob_name` with its final extension removed ("the stem").
///
/// `img_0.png` -> `img_0`. A name with no extension is returned unchanged.
pub fn stem_of(blob_name: &str) -> &str {
    blob_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(blob_name)
}
