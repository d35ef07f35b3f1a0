pub mod posts;

pub use posts::*;

use html_escape::decode_html_entities;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    collapse_whitespace(&decoded)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed prefix of a page, at most `max_chars` characters long.
pub fn html_snippet(html: &str, max_chars: usize) -> String {
    collapse_whitespace(html).chars().take(max_chars).collect()
}
