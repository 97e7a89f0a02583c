//! Venue slug generation
//!
//! A slug is a lowercase, hyphen-separated identifier built from a venue's
//! name, its street address and its city. Slugs are stored in the `slug`
//! property of every GeoJSON feature and are used downstream as stable URL
//! segments, so the transformation below must not drift: changing the order
//! of any step changes existing identifiers.
//!
//! # Algorithm
//! 1. Replace digits, whitespace and punctuation in the label with spaces
//! 2. Replace whitespace and punctuation (not digits) in the address with spaces
//! 3. Collect the street-name tokens: the address up to its first digit,
//!    split on whitespace, deduplicated in first-seen order
//! 4. Strip every occurrence of each street token from the cleaned label
//! 5. Join `label address city`, lowercase, trim
//! 6. Apply [`SYMBOLS`] then [`UMLAUTS`]
//! 7. Collapse whitespace runs and turn the remaining spaces into hyphens

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered `(pattern, replacement)` pairs applied by [`replace_all`].
pub type ReplacementTable = [(&'static str, &'static str)];

/// Symbols removed after assembly. `&` is spelled out in German.
pub const SYMBOLS: &ReplacementTable = &[
    ("©", ""),
    ("\"", ""),
    ("\\", ""),
    ("&", "und"),
    ("(", ""),
    (")", ""),
];

/// German umlauts and sharp s to ASCII digraphs.
///
/// Input is already lowercased when this runs, so the uppercase entries only
/// matter for callers using [`replace_all`] directly.
pub const UMLAUTS: &ReplacementTable = &[
    ("ü", "ue"),
    ("Ü", "Ue"),
    ("ä", "ae"),
    ("Ä", "Ae"),
    ("ö", "oe"),
    ("Ö", "Oe"),
    ("ß", "ss"),
];

static LABEL_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\d\s!@#$%\^&*()\[\]{};:,./<>?|`~\-=_+]").expect("label pattern is valid")
});

static ADDRESS_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s!@#$%\^&*()\[\]{};:,./<>?|`~\-=_+]").expect("address pattern is valid")
});

static HOUSE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d.*").expect("house number pattern is valid"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Derive the slug for a venue.
///
/// Total over all inputs: empty fields contribute empty segments and
/// characters outside the replacement tables pass through unchanged.
///
/// ```
/// use kultur_ingest::slug::generate_slug;
///
/// assert_eq!(
///     generate_slug("Müller", "Köln", "Hauptstraße 5"),
///     "mueller-hauptstrasse-5-koeln"
/// );
/// ```
pub fn generate_slug(label: &str, city: &str, address: &str) -> String {
    let mut title = LABEL_NOISE.replace_all(label, " ").into_owned();
    let addr = ADDRESS_NOISE.replace_all(address, " ");

    // Plain substring removal: a token also disappears from inside longer words.
    for token in street_tokens(address) {
        title = title.replace(token.as_str(), "");
    }

    let assembled = format!("{title} {addr} {city}").to_lowercase();
    let slug = replace_all(assembled.trim(), SYMBOLS);
    let slug = replace_all(&slug, UMLAUTS);

    WHITESPACE.replace_all(&slug, " ").replace(' ', "-")
}

/// Street-name tokens of an address: everything before the first digit,
/// split on whitespace, without duplicates.
pub fn street_tokens(address: &str) -> Vec<String> {
    let street = HOUSE_NUMBER.replace_all(address, "");
    let mut tokens: Vec<String> = Vec::new();

    for token in street.split_whitespace() {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }

    tokens
}

/// Apply each `(pattern, replacement)` pair in order.
pub fn replace_all(input: &str, table: &ReplacementTable) -> String {
    table
        .iter()
        .fold(input.to_string(), |acc, &(from, to)| acc.replace(from, to))
}

/// Whether `slug` is non-empty lowercase ASCII kebab-case.
///
/// [`generate_slug`] does not guarantee this (punctuation-only labels can
/// leave a leading hyphen, cities keep their punctuation), so callers use it
/// to flag records worth a second look.
pub fn is_clean_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
