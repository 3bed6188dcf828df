//! Self-mention detection.
//!
//! Matching is a plain case-sensitive substring search with no word-boundary
//! check: a handle `bot` is "mentioned" by the word `robot`.

/// Whitespace stripped around the extracted query.
const QUERY_TRIM: [char; 4] = [' ', '\t', '\n', '\r'];

/// True when `text` contains `@handle` or the bare `handle`.
pub fn is_mentioned(text: &str, handle: &str) -> bool {
    strip_mention(text, handle).is_some()
}

/// Returns the text after the first mention, trimmed, or `None` if `text`
/// does not mention `handle`.
///
/// The `@handle` form wins over an earlier bare occurrence.
pub fn strip_mention<'a>(text: &'a str, handle: &str) -> Option<&'a str> {
    let at_handle = format!("@{handle}");
    let end = text
        .find(&at_handle)
        .map(|i| i + at_handle.len())
        .or_else(|| text.find(handle).map(|i| i + handle.len()))?;
    Some(text[end..].trim_matches(&QUERY_TRIM[..]))
}
