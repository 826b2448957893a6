// SPDX-License-Identifier: MIT OR Apache-2.0
//! Metadata distiller (§4.3) and vision hints deriver (§4.4).

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Free-form description line parsing into a curated fact set.
pub mod distiller;
/// Camera-angle detection from blob name, provider tags, or metadata.
pub mod vision;

pub use distiller::extract_product_facts;
pub use vision::derive_vision_hints;
