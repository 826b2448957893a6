//! User instruction composer (§4.5 step 2).

use alt_core::{MetadataDocument, ProductFacts, VisionHints};

/// Compose the multi-section user instruction: filename, product metadata,
/// product facts, visual hints, and a closing task sentence (§4.5 step 2).
pub fn compose_user_instruction(
    blob_name: &str,
    metadata: &MetadataDocument,
    facts: &ProductFacts,
    hints: &VisionHints,
) -> String {
    let mut sections = Vec::new();

    sections.push(format!("Image filename: {blob_name}"));

    let mut product_metadata = vec!["Product Metadata:".to_string()];
    if let Some(brand) = &metadata.brand {
        product_metadata.push(format!("- Brand: {brand}"));
    }
    if let Some(model) = &metadata.model {
        product_metadata.push(format!("- Model: {model}"));
    }
    if product_metadata.len() > 1 {
        sections.push(product_metadata.join("\n"));
    }

    if !facts.is_empty() {
        let mut lines = vec!["Product Facts:".to_string()];
        for (key, value) in facts.iter() {
            lines.push(format!("- {key}: {value}"));
        }
        sections.push(lines.join("\n"));
    }

    let mut hint_lines = vec!["Visual Hints:".to_string()];
    if let Some(angle) = hints.angle {
        hint_lines.push(format!("- Angle: {angle:?}"));
    }
    if !hints.observed_objects.is_empty() {
        hint_lines.push(format!("- Objects: {}", hints.observed_objects.join(", ")));
    }
    if hint_lines.len() > 1 {
        sections.push(hint_lines.join("\n"));
    }

    sections.push(
        "Task: write one concise English sentence of alt text describing the product shown."
            .to_string(),
    );

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alt_core::Angle;

    #[test]
    fn includes_filename_and_task_sentence_unconditionally() {
        let instruction = compose_user_instruction(
            "img_0.png",
            &MetadataDocument::default(),
            &ProductFacts::empty(),
            &VisionHints::default(),
        );
        assert!(instruction.contains("Image filename: img_0.png"));
        assert!(instruction.contains("Task:"));
    }

    #[test]
    fn omits_empty_sections() {
        let instruction = compose_user_instruction(
            "img_0.png",
            &MetadataDocument::default(),
            &ProductFacts::empty(),
            &VisionHints::default(),
        );
        assert!(!instruction.contains("Product Metadata"));
        assert!(!instruction.contains("Product Facts"));
        assert!(!instruction.contains("Visual Hints"));
    }

    #[test]
    fn includes_brand_model_facts_and_hints_when_present() {
        let metadata = MetadataDocument {
            brand: Some("Acme".to_string()),
            model: Some("X1".to_string()),
            ..MetadataDocument::default()
        };
        let mut facts = ProductFacts::empty();
        facts.insert("color", "white");
        let hints = VisionHints {
            angle: Some(Angle::Front),
            observed_objects: vec!["printer".to_string()],
        };

        let instruction = compose_user_instruction("img_0.png", &metadata, &facts, &hints);
        assert!(instruction.contains("Brand: Acme"));
        assert!(instruction.contains("Model: X1"));
        assert!(instruction.contains("color: white"));
        assert!(instruction.contains("Objects: printer"));
    }
}
