use std::sync::LazyLock;

use regex::Regex;

/// Phone-number-shaped substrings: optional country code (+NN) or 4-digit
/// prefix, then 3-3-4, (3) 3-4, or 3-4 digit groups separated by `-`, `.`
/// or whitespace.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\+\d{2}[-.\s]??|\d{4}[-.\s]??)?(?:\d{3}[-.\s]??\d{3}[-.\s]??\d{4}|\(\d{3}\)\s*\d{3}[-.\s]??\d{4}|\d{3}[-.\s]??\d{4})",
    )
    .expect("valid phone regex")
});

/// Extract every phone-number-shaped substring from `text`.
/// An empty result is a normal outcome, not an error.
pub fn find_phone_numbers(text: &str) -> Vec<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
