// Address normalization for geocoding queries.
// Trims annotations and unit suffixes that make geocoders miss partial addresses.

use std::sync::LazyLock;

use regex::Regex;

/// Tokens that mark a city, district, or county in a Korean address.
const REGION_TOKENS: [&str; 3] = ["시", "구", "군"];

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("invalid parenthetical regex"));

static UNIT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:지하\s*)?[Bb]?\d+(?:\s*[~-]\s*\d+)?\s*(?:층|호|[Ff])$")
        .expect("invalid unit suffix regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

/// Normalize free-text address input into a geocoder query.
///
/// Drops parenthetical notes, everything after the first comma, and trailing
/// floor/unit suffixes (`3층`, `지하1층`, `201호`, `2F`). When the remainder
/// names no region, `default_region` is prefixed. Returns an empty string
/// when nothing addressable is left.
pub fn normalize_address(raw: &str, default_region: &str) -> String {
    let without_notes = PARENTHETICAL.replace_all(raw, " ");
    let head = without_notes.split(',').next().unwrap_or_default();

    let mut text = WHITESPACE.replace_all(head.trim(), " ").into_owned();
    loop {
        let stripped = UNIT_SUFFIX.replace(&text, "").trim_end().to_string();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    if text.is_empty() {
        return text;
    }

    let default_region = default_region.trim();
    if default_region.is_empty() || has_region(&text) {
        text
    } else {
        format!("{} {}", default_region, text)
    }
}

fn has_region(text: &str) -> bool {
    REGION_TOKENS.iter().any(|token| text.contains(token))
}
