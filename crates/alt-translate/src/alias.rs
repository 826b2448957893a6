//! Non-standard language-code aliasing (§4.9).

/// Map a requested two-letter (or aliased) code to the translation API's
/// code. Unrecognized codes pass through unchanged — the API rejects them
/// on its own terms.
pub fn map_to_api_code(requested: &str) -> &str {
    match requested {
        "jp" => "ja",
        "cn" => "zh-Hans",
        "tw" => "zh-Hant",
        "kr" => "ko",
        "br" => "pt",
        "cz" => "cs",
        "dk" => "da",
        "gr" => "el",
        "se" => "sv",
        "no" => "nb",
        other => other,
    }
}

/// Lower-case and take the two-letter prefix of a requested language code
/// (e.g. `"JP"` -> `"jp"`, `"pt-BR"` -> `"pt"`).
pub fn normalize_requested_code(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    lower.split(['-', '_']).next().unwrap_or(&lower).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_aliases_map_to_their_api_codes() {
        assert_eq!(map_to_api_code("jp"), "ja");
        assert_eq!(map_to_api_code("cn"), "zh-Hans");
        assert_eq!(map_to_api_code("tw"), "zh-Hant");
        assert_eq!(map_to_api_code("kr"), "ko");
        assert_eq!(map_to_api_code("br"), "pt");
        assert_eq!(map_to_api_code("cz"), "cs");
        assert_eq!(map_to_api_code("dk"), "da");
        assert_eq!(map_to_api_code("gr"), "el");
        assert_eq!(map_to_api_code("se"), "sv");
        assert_eq!(map_to_api_code("no"), "nb");
    }

    #[test]
    fn unaliased_codes_pass_through() {
        assert_eq!(map_to_api_code("fr"), "fr");
        assert_eq!(map_to_api_code("de"), "de");
    }

    #[test]
    fn normalize_lowercases_and_takes_two_letter_prefix() {
        assert_eq!(normalize_requested_code("JP"), "jp");
        assert_eq!(normalize_requested_code("pt-BR"), "pt");
        assert_eq!(normalize_requested_code(" Fr "), "fr");
    }
}
