//! Plain-text helpers shared by the extractor and the summarizer

use std::borrow::Cow;

/// Collapses every whitespace run into a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if the text has nothing but whitespace
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Truncates to at most `max_chars` characters, appending `marker` when cut.
///
/// Counts characters rather than bytes so multi-byte text is never split
/// inside a code point.
pub fn truncate_chars<'a>(text: &'a str, max_chars: usize, marker: &str) -> Cow<'a, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + marker.len());
            truncated.push_str(&text[..cut]);
            truncated.push_str(marker);
            Cow::Owned(truncated)
        }
    }
}
