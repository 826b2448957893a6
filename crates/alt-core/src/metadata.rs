// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-image metadata document and the facts/hints distilled from it
//! (§3 `MetadataDocument`, `ProductFacts`, `VisionHints`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The companion `.yml` document for an image.
///
/// Absent or malformed documents are not an error at this layer: callers
/// fall back to [`MetadataDocument::default`] (English-only, no
/// brand/model) per §3's invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Asset identifier.
    #[serde(default)]
    pub asset: Option<String>,
    /// Source tag, selects the system prompt (§4.5 step 1).
    #[serde(default)]
    pub source: Option<String>,
    /// Target language codes (two-letter, case-insensitive, possibly aliased).
    #[serde(default)]
    pub languages: Vec<String>,
    /// Brand name.
    #[serde(default)]
    pub brand: Option<String>,
    /// Model name.
    #[serde(default)]
    pub model: Option<String>,
    /// Free-form description, line-parsed into [`ProductFacts`].
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit angle hint, used as a last resort by the vision deriver.
    #[serde(default)]
    pub angle: Option<String>,
}

impl MetadataDocument {
    /// The requested language list, defaulting to `["en"]` when empty (§4.2 step 2).
    pub fn languages_or_default(&self) -> Vec<String> {
        if self.languages.is_empty() {
            vec!["en".to_string()]
        } else {
            self.languages.clone()
        }
    }

    /// Source tag, defaulting to an empty string (selects the default prompt).
    pub fn source_or_default(&self) -> String {
        self.source.clone().unwrap_or_default()
    }
}

/// A curated, short fact set derived from a free-form product description
/// (§4.3). Keys are normalized (lower-case, spaces -> underscores); values
/// are at most 100 characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFacts(pub BTreeMap<String, String>);

impl ProductFacts {
    /// An empty fact set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert a fact, silently doing nothing if either side is empty.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.0.insert(key, value);
    }

    /// Iterate facts in deterministic (lexicographic key) order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no facts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Recognized camera/product angle categories (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Angle {
    /// Front-facing / face-on view.
    Front,
    /// An angled / perspective / three-quarter view.
    Angle,
    /// A side / profile view.
    Side,
    /// An overhead / bird's-eye view.
    Top,
    /// A close-up / macro detail shot.
    Detail,
    /// An in-use / action shot.
    Action,
}

impl Angle {
    /// All recognized angle variants, in the table order of §4.4.
    pub const ALL: [Angle; 6] = [
        Angle::Front,
        Angle::Angle,
        Angle::Side,
        Angle::Top,
        Angle::Detail,
        Angle::Action,
    ];

    /// Triggering substrings for this angle, matched case-insensitively.
    pub fn triggers(&self) -> &'static [&'static str] {
        match self {
            Angle::Front => &[
                "front view",
                "front-facing",
                "face-on",
                "straight on",
                "frontal",
            ],
            Angle::Angle => &["angled", "perspective", "iso", "3/4 view", "three-quarter"],
            Angle::Side => &["side view", "profile", "left side", "right side"],
            Angle::Top => &["top view", "overhead", "above", "bird's eye"],
            Angle::Detail => &["close-up", "close up", "detail", "macro", "zoom"],
            Angle::Action => &["in use", "action shot", "printing", "scanning", "operating"],
        }
    }
}

/// Derived visual context for the describer (§3 `VisionHints`, §4.4).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionHints {
    /// The detected (or hinted) camera angle, if any.
    #[serde(default)]
    pub angle: Option<Angle>,
    /// Objects a prior provider pass observed in the image.
    #[serde(default)]
    pub observed_objects: Vec<String>,
}
