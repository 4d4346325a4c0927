//! String normalization for artist and track comparison.
//!
//! Every comparison in the crate (discography dedup, catalog matching,
//! genre reuse) goes through these functions so that "Beyoncé & Jay-Z"
//! and "beyonce and jay z" compare equal.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Leading track numbers: "01 - ", "3. ", "12 ".
static TRACK_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[-.]?\s*").expect("track number pattern is valid"));

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Check if a character is a Unicode combining mark (diacritic).
fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// NFKD-decompose and drop combining marks: "Beyoncé" → "Beyonce".
pub fn fold_diacritics(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Collapse runs of whitespace into one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    MULTI_SPACE.replace_all(s.trim(), " ").into_owned()
}

/// Canonical comparison form of free text.
///
/// Folds diacritics and case, turns `&`/`+` into "and", replaces
/// punctuation (other than apostrophes) with spaces and collapses
/// whitespace.
///
/// ```
/// use music_curator::normalize::normalize_text;
/// assert_eq!(normalize_text("  Beyoncé & Jay-Z "), "beyonce and jay z");
/// ```
pub fn normalize_text(s: &str) -> String {
    let folded = fold_diacritics(s).to_lowercase();
    let mut out = String::with_capacity(folded.len());
    for c in folded.chars() {
        match c {
            '&' | '+' => out.push_str(" and "),
            '\u{2018}' | '\u{2019}' | '\'' => out.push('\''),
            c if c.is_alphanumeric() || c.is_whitespace() => out.push(c),
            _ => out.push(' '),
        }
    }
    collapse_whitespace(&out)
}

/// Canonical comparison form of an artist name.
pub fn normalize_artist(s: &str) -> String {
    normalize_text(s)
}

/// Human-readable title from a filename.
///
/// Strips the extension and a leading track number, maps underscores to
/// spaces and collapses whitespace. Case is preserved.
pub fn clean_filename_title(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let without_number = TRACK_NUMBER_PREFIX.replace(stem, "");
    // A name that is only a number keeps it.
    let base = if without_number.trim().is_empty() {
        stem.to_string()
    } else {
        without_number.into_owned()
    };
    collapse_whitespace(&base.replace('_', " "))
}

/// Comparison form of a filename: [`clean_filename_title`] then [`normalize_text`].
pub fn normalize_filename_stem(filename: &str) -> String {
    normalize_text(&clean_filename_title(filename))
}

/// Case-insensitive identity used for candidate dedup.
pub fn dedup_key(track_name: &str, artist_name: &str) -> (String, String) {
    (
        track_name.trim().to_lowercase(),
        artist_name.trim().to_lowercase(),
    )
}
