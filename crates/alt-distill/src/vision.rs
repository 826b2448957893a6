//! Camera-angle detection (§4.4).

use alt_core::{Angle, MetadataDocument, VisionHints};

/// Find the first [`Angle`] whose trigger substring (case-insensitive)
/// appears in `haystack`, in the table order of §4.4.
fn detect_angle_in(haystack: &str) -> Option<Angle> {
    let lower = haystack.to_ascii_lowercase();
    Angle::ALL
        .into_iter()
        .find(|angle| angle.triggers().iter().any(|trigger| lower.contains(trigger)))
}

/// Parse an explicit `angle` metadata field by variant name (§4.4 last
/// resort), not by keyword search.
fn angle_from_name(name: &str) -> Option<Angle> {
    match name.trim().to_ascii_lowercase().as_str() {
        "front" => Some(Angle::Front),
        "angle" => Some(Angle::Angle),
        "side" => Some(Angle::Side),
        "top" => Some(Angle::Top),
        "detail" => Some(Angle::Detail),
        "action" => Some(Angle::Action),
        _ => None,
    }
}

/// Derive [`VisionHints`] from the blob name, a prior provider's observed
/// object/tag list, and the metadata document's explicit `angle` field, in
/// that priority order (§4.4).
pub fn derive_vision_hints(
    blob_name: &str,
    provider_tags: &[String],
    metadata: &MetadataDocument,
) -> VisionHints {
    let angle = detect_angle_in(blob_name)
        .or_else(|| provider_tags.iter().find_map(|tag| detect_angle_in(tag)))
        .or_else(|| metadata.angle.as_deref().and_then(angle_from_name));

    VisionHints {
        angle,
        observed_objects: provider_tags.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md() -> MetadataDocument {
        MetadataDocument::default()
    }

    #[test]
    fn detects_angle_from_blob_name() {
        let hints = derive_vision_hints("product_front_view_01.png", &[], &md());
        assert_eq!(hints.angle, Some(Angle::Front));
    }

    #[test]
    fn detects_angle_case_insensitively() {
        let hints = derive_vision_hints("PRODUCT-TOP-VIEW.png", &[], &md());
        assert_eq!(hints.angle, Some(Angle::Top));
    }

    #[test]
    fn falls_back_to_provider_tags_when_blob_name_has_no_hint() {
        let tags = vec!["studio shot".to_string(), "close-up detail".to_string()];
        let hints = derive_vision_hints("img_001.png", &tags, &md());
        assert_eq!(hints.angle, Some(Angle::Detail));
        assert_eq!(hints.observed_objects, tags);
    }

    #[test]
    fn falls_back_to_explicit_metadata_angle_field() {
        let metadata = MetadataDocument {
            angle: Some("side".to_string()),
            ..MetadataDocument::default()
        };
        let hints = derive_vision_hints("img_001.png", &[], &metadata);
        assert_eq!(hints.angle, Some(Angle::Side));
    }

    #[test]
    fn no_hint_anywhere_yields_none() {
        let hints = derive_vision_hints("img_001.png", &[], &md());
        assert_eq!(hints.angle, None);
    }

    #[test]
    fn blob_name_hint_takes_priority_over_tags_and_metadata() {
        let tags = vec!["top view".to_string()];
        let metadata = MetadataDocument {
            angle: Some("action".to_string()),
            ..MetadataDocument::default()
        };
        let hints = derive_vision_hints("front-facing-shot.png", &tags, &metadata);
        assert_eq!(hints.angle, Some(Angle::Front));
    }
}
