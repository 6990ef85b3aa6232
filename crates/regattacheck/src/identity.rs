//! Identity normalization for sail numbers and country codes.
//!
//! These are pure, total functions: they never fail and never touch storage.
//! The normalized sail number is the matching key used throughout the roster
//! and event stores.

/// Canonicalize a raw sail number into its matching key.
///
/// Trims, upper-cases, and strips everything that is not an ASCII letter or
/// digit. If the remaining string contains digits, only the digits are kept
/// (so `"USA 214567"`, `"usa-214567"`, and `"214567"` all normalize to
/// `"214567"`). Purely alphabetic identifiers collapse to their letters.
/// Empty input normalizes to the empty string, which matches nothing.
#[must_use]
pub fn normalize_sail(raw: &str) -> String {
    let compact: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    let digits: String = compact.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        compact
    } else {
        digits
    }
}

/// Neutral placeholder shown when no valid country code is available.
const NEUTRAL_FLAG: &str = "\u{1f3f3}\u{fe0f}";

/// Map an exact 2-letter alphabetic country code to its flag glyph.
///
/// Any other input (empty, wrong length, non-alphabetic) returns a neutral
/// white-flag placeholder.
#[must_use]
pub fn flag_emoji(country: &str) -> String {
    let code = country.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return NEUTRAL_FLAG.to_string();
    }

    code.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(0x1f1e6 + (u32::from(c) - u32::from('A'))))
        .collect()
}
