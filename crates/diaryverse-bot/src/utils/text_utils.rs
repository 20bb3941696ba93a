//! Text helpers for log lines and request payloads

use std::borrow::Cow;

/// First `max_chars` characters of `text`, cut on a char boundary.
///
/// Used to keep user content short in log lines.
pub fn preview(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => Cow::Borrowed(&text[..end]),
        None => Cow::Borrowed(text),
    }
}

/// Trimmed message, or `None` when nothing but whitespace was sent.
pub fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
