// SPDX-License-Identifier: MIT OR Apache-2.0
//! Response normalizer (§4.6).
//!
//! Describer models return free-form text that is sometimes bare JSON,
//! sometimes fenced inside a code block, and sometimes prose with JSON
//! embedded somewhere in the middle. [`normalize`] tries five strategies in
//! order and keeps the first that yields a non-empty `alt_en`, then applies
//! punctuation normalization to the result.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use regex::Regex;
use std::sync::OnceLock;

fn fenced_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)```").expect("fixed pattern")
    })
}

fn narrow_object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\{[^{}]*"alt_en"[^{}]*\}"#).expect("fixed pattern"))
}

fn any_object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.+\}").expect("fixed pattern"))
}

/// Maximum length the fallback line strategy truncates to, with a `...`
/// suffix appended when truncated (§4.6 strategy 5).
const FALLBACK_MAX_LEN: usize = 200;

/// Minimum line length (exclusive) considered for the fallback strategy.
const FALLBACK_MIN_LINE_LEN: usize = 10;

fn alt_en_from_json_object(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let alt_en = value.get("alt_en")?.as_str()?;
    if alt_en.is_empty() {
        None
    } else {
        Some(alt_en.to_string())
    }
}

/// Strategy 1: parse the entire string as a JSON object.
fn strategy_whole_json(text: &str) -> Option<String> {
    alt_en_from_json_object(text.trim())
}

/// Strategy 2: find a fenced code block and parse its contents as JSON.
fn strategy_fenced_block(text: &str) -> Option<String> {
    let captures = fenced_block_regex().captures(text)?;
    alt_en_from_json_object(captures[1].trim())
}

/// Strategy 3: find the first narrow `{...}` span containing `"alt_en"`.
fn strategy_narrow_object(text: &str) -> Option<String> {
    let matched = narrow_object_regex().find(text)?;
    alt_en_from_json_object(matched.as_str())
}

/// Strategy 4: find any `{...}` span, dot matching newlines.
fn strategy_any_object(text: &str) -> Option<String> {
    let matched = any_object_regex().find(text)?;
    alt_en_from_json_object(matched.as_str())
}

/// Strategy 5: strip markdown decoration, take the first substantial line.
fn strategy_fallback_line(text: &str) -> Option<String> {
    let stripped = text.replace("**", "");
    for line in stripped.lines() {
        let line = line.trim_start_matches('#').trim();
        if line.chars().count() > FALLBACK_MIN_LINE_LEN {
            return Some(truncate_with_ellipsis(line, FALLBACK_MAX_LEN));
        }
    }
    None
}

fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len).collect();
    format!("{truncated}...")
}

/// Capitalize the first character (Unicode-aware) and ensure the string ends
/// in `.`, `!`, or `?`. Empty input is returned unchanged (§4.6).
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut chars = text.chars();
    let first = chars.next().expect("checked non-empty above");
    let capitalized: String = first.to_uppercase().chain(chars).collect();

    match capitalized.chars().last() {
        Some('.') | Some('!') | Some('?') => capitalized,
        _ => format!("{capitalized}."),
    }
}

/// Extract and punctuation-normalize `alt_en` from free-form describer
/// output, trying each strategy in order (§4.6).
pub fn normalize(raw: &str) -> String {
    let extracted = strategy_whole_json(raw)
        .or_else(|| strategy_fenced_block(raw))
        .or_else(|| strategy_narrow_object(raw))
        .or_else(|| strategy_any_object(raw))
        .or_else(|| strategy_fallback_line(raw))
        .unwrap_or_default();

    normalize_punctuation(&extracted)
}
