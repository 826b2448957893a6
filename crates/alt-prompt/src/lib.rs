// SPDX-License-Identifier: MIT OR Apache-2.0
//! Embedded system-prompt and response-format composer (§4.5 step 1, §9).
//!
//! The source system reads prompt text from a directory at request time;
//! this crate embeds the equivalent markdown files in the binary via
//! `include_str!` and resolves them through a three-tier fallback so a
//! production build has no file-system dependency (§9 "Prompt files as
//! embedded resources").
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeMap;

/// Used only if the embedded default system prompt is somehow unavailable —
/// the final constant in the §9 fallback chain.
const HARDCODED_SYSTEM_PROMPT_FALLBACK: &str =
    "Describe this product image in one concise English sentence suitable for alt text.";

/// Used only if the embedded response-format file is somehow unavailable.
const HARDCODED_RESPONSE_FORMAT_FALLBACK: &str =
    r#"Respond with JSON only: {"alt_en": "<alt text>"}"#;

/// Normalize a metadata `source` tag into a lookup key: lowercase, with
/// spaces and hyphens collapsed to underscores (§4.5 step 1).
pub fn normalize_source(source: &str) -> String {
    source
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

/// Embedded system prompts and response-format instruction, keyed by
/// normalized source.
pub struct PromptLibrary {
    system_prompts: BTreeMap<&'static str, &'static str>,
    default_system_prompt: Option<&'static str>,
    response_format: Option<&'static str>,
}

impl PromptLibrary {
    /// Build the library from the markdown files embedded at compile time.
    pub fn embedded() -> Self {
        let mut system_prompts = BTreeMap::new();
        system_prompts.insert(
            "acme_retail",
            include_str!("../prompts/acme_retail_system_prompt.md"),
        );
        system_prompts.insert(
            "contoso_home",
            include_str!("../prompts/contoso_home_system_prompt.md"),
        );
        Self {
            system_prompts,
            default_system_prompt: Some(include_str!("../prompts/default_system_prompt.md")),
            response_format: Some(include_str!("../prompts/response_format.md")),
        }
    }

    /// Compose the full system instruction for `source`: the resolved
    /// system prompt body followed by the response-format instruction
    /// (§4.5 step 1).
    pub fn system_instruction(&self, source: &str) -> String {
        let key = normalize_source(source);
        let body = self
            .system_prompts
            .get(key.as_str())
            .copied()
            .or(self.default_system_prompt)
            .unwrap_or(HARDCODED_SYSTEM_PROMPT_FALLBACK);
        let response_format = self.response_format.unwrap_or(HARDCODED_RESPONSE_FORMAT_FALLBACK);
        format!("{}\n\n{}", body.trim_end(), response_format.trim_end())
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_source_lowercases_and_collapses_separators() {
        assert_eq!(normalize_source("Acme Retail"), "acme_retail");
        assert_eq!(normalize_source("ACME-RETAIL"), "acme_retail");
        assert_eq!(normalize_source(" acme_retail "), "acme_retail");
    }

    #[test]
    fn known_source_resolves_its_own_prompt() {
        let library = PromptLibrary::embedded();
        let instruction = library.system_instruction("Acme Retail");
        assert!(instruction.contains("Acme Retail catalog"));
    }

    #[test]
    fn unknown_source_falls_back_to_default_prompt() {
        let library = PromptLibrary::embedded();
        let instruction = library.system_instruction("some unlisted vendor");
        assert!(instruction.contains("Alt-text writer"));
        assert!(!instruction.contains("Acme Retail catalog"));
        assert!(!instruction.contains("Contoso Home catalog"));
    }

    #[test]
    fn empty_source_falls_back_to_default_prompt() {
        let library = PromptLibrary::embedded();
        let instruction = library.system_instruction("");
        assert!(instruction.contains("Alt-text writer"));
    }

    #[test]
    fn response_format_is_always_appended() {
        let library = PromptLibrary::embedded();
        assert!(library.system_instruction("contoso home").contains("Response format"));
        assert!(library.system_instruction("unknown").contains("Response format"));
    }

    #[test]
    fn missing_default_and_response_format_use_hardcoded_constants() {
        let library = PromptLibrary {
            system_prompts: BTreeMap::new(),
            default_system_prompt: None,
            response_format: None,
        };
        let instruction = library.system_instruction("anything");
        assert_eq!(
            instruction,
            format!(
                "{}\n\n{}",
                HARDCODED_SYSTEM_PROMPT_FALLBACK, HARDCODED_RESPONSE_FORMAT_FALLBACK
            )
        );
    }
}
