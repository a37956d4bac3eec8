//! Text cleanup applied to every extracted review field

/// Zero-width non-joiner, common inside Persian and Arabic words
const ZERO_WIDTH_NON_JOINER: char = '\u{200c}';

/// Normalizes free text for persistence
///
/// Removes zero-width non-joiners, collapses every run of whitespace
/// (newlines and tabs included) into a single space and trims both ends.
/// Total over all inputs; the empty string maps to itself.
///
/// # Example
///
/// ```
/// use review_crawler::normalize;
///
/// assert_eq!(normalize("a\u{200c} b\n\tc"), "a b c");
/// ```
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.replace(ZERO_WIDTH_NON_JOINER, ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
