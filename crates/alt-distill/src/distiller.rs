//! `extract(description) -> ProductFacts` (§4.3).

use alt_core::ProductFacts;
use regex::Regex;
use std::sync::OnceLock;

/// Free-form promotional language discarded before fact extraction, grouped
/// by the §4.3 table. Matched as whole words, case-insensitively, anywhere
/// in the line.
const PROMOTIONAL_GROUPS: &[&[&str]] = &[
    &["warranty", "guarantee", "limited warranty"],
    &["free", "complimentary", "included at no extra cost"],
    &["best", "revolutionary", "innovative", "cutting-edge"],
    &["certified", "patented", "proprietary"],
    &["savings", "discount", "reduced price"],
];

/// Maximum length (in characters) a fact value may have to be kept (§4.3).
const MAX_FACT_VALUE_LEN: usize = 100;

fn promotional_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternatives: Vec<String> = PROMOTIONAL_GROUPS
            .iter()
            .flat_map(|group| group.iter())
            .map(|phrase| regex::escape(phrase))
            .collect();
        let pattern = format!(r"(?i)\b({})\b", alternatives.join("|"));
        Regex::new(&pattern).expect("promotional pattern set is a fixed, valid regex")
    })
}

fn fact_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z ]+):\s*(.+)$").expect("fixed pattern"))
}

/// Lowercase a key and replace spaces with underscores (§4.3).
fn normalize_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(' ', "_")
}

/// Distill a free-form product description into a curated key/value fact
/// set, dropping promotional boilerplate and oversized values (§4.3).
pub fn extract_product_facts(description: &str) -> ProductFacts {
    let mut facts = ProductFacts::empty();

    for raw_line in description.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if promotional_regex().is_match(line) {
            continue;
        }
        let Some(captures) = fact_line_regex().captures(line) else {
            continue;
        };
        let key = &captures[1];
        let value = &captures[2];
        if value.chars().count() >= MAX_FACT_VALUE_LEN {
            continue;
        }
        facts.insert(normalize_key(key), value.trim());
    }

    facts
}
