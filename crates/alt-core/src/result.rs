// SPDX-License-Identifier: MIT OR Apache-2.0
//! The persisted alt-text sidecar and the blob tag set (§3 `AltTextResult`,
//! `TagSet`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The structured sidecar persisted alongside each processed image.
///
/// Invariant: `alt_text` always contains the key `"en"` with a non-empty
/// value, and its other keys equal the requested language set minus `en`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltTextResult {
    /// Asset identifier (from metadata, or the image stem if absent).
    pub asset: String,
    /// Original image blob name.
    pub image: String,
    /// Source tag used to select the system prompt.
    pub source: String,
    /// Language code -> translated text, lower-case two-letter keys.
    #[serde(rename = "altText")]
    pub alt_text: BTreeMap<String, String>,
    /// When this sidecar was generated.
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
}

impl AltTextResult {
    /// The sidecar blob name for an image with the given stem:
    /// `<stem>.alt.json` (§3 invariant).
    pub fn sidecar_name(stem: &str) -> String {
        format!("{stem}.alt.json")
    }

    /// `true` if the `en` key is present and non-empty, and every other key
    /// is a lower-case two-letter code.
    pub fn has_valid_shape(&self) -> bool {
        match self.alt_text.get("en") {
            Some(en) if !en.is_empty() => {}
            _ => return false,
        }
        self.alt_text.keys().all(|k| {
            k.len() == 2 && k.chars().all(|c| c.is_ascii_lowercase())
        })
    }
}

/// The tag set applied to a processed image blob (§3, §8 invariant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    /// Comma-joined language codes, in the order requested.
    pub langs: String,
}

impl TagSet {
    /// Build a tag set from an ordered list of language codes.
    pub fn new(langs: impl IntoIterator<Item = String>) -> Self {
        Self {
            langs: langs.into_iter().collect::<Vec<_>>().join(","),
        }
    }

    /// Render as the exact `{processed, alt.v, langs}` map persisted to the
    /// object store.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("processed".to_string(), "true".to_string());
        map.insert("alt.v".to_string(), "1".to_string());
        map.insert("langs".to_string(), self.langs.clone());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(alt_text: BTreeMap<String, String>) -> AltTextResult {
        AltTextResult {
            asset: "asset-1".into(),
            image: "img_0.png".into(),
            source: "public website".into(),
            alt_text,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn sidecar_name_appends_alt_json() {
        assert_eq!(AltTextResult::sidecar_name("img_0"), "img_0.alt.json");
    }

    #[test]
    fn valid_shape_requires_non_empty_english() {
        let mut alt = BTreeMap::new();
        alt.insert("en".to_string(), "A printer.".to_string());
        assert!(sample(alt).has_valid_shape());
    }

    #[test]
    fn invalid_shape_rejects_empty_english() {
        let mut alt = BTreeMap::new();
        alt.insert("en".to_string(), String::new());
        assert!(!sample(alt).has_valid_shape());
    }

    #[test]
    fn invalid_shape_rejects_missing_english() {
        let mut alt = BTreeMap::new();
        alt.insert("fr".to_string(), "Une imprimante.".to_string());
        assert!(!sample(alt).has_valid_shape());
    }

    #[test]
    fn invalid_shape_rejects_non_two_letter_keys() {
        let mut alt = BTreeMap::new();
        alt.insert("en".to_string(), "A printer.".to_string());
        alt.insert("eng".to_string(), "A printer.".to_string());
        assert!(!sample(alt).has_valid_shape());
    }

    #[test]
    fn tag_set_has_exact_keys_and_values() {
        let tags = TagSet::new(["en".to_string(), "jp".to_string(), "nl".to_string()]);
        let map = tags.to_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["processed"], "true");
        assert_eq!(map["alt.v"], "1");
        assert_eq!(map["langs"], "en,jp,nl");
    }
}
