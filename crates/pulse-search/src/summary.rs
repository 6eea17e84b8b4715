//! Sentence-based summary bullets.

use std::sync::LazyLock;

use regex::Regex;

pub const SUMMARY_UNAVAILABLE: &str = "Sintesi non disponibile";

const MAX_BULLETS: usize = 3;
const FALLBACK_PREFIX_CHARS: usize = 160;

static NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("valid newline regex"));

/// Split `text` after `.`, `!` or `?` when followed by whitespace.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            if let Some(&(next_idx, next)) = chars.peek() {
                if next.is_whitespace() {
                    out.push(&text[start..next_idx]);
                    start = next_idx;
                }
            }
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Up to three leading sentences of `content`, trimmed. Blank content
/// yields [`SUMMARY_UNAVAILABLE`].
#[must_use]
pub fn summary_bullets(content: &str) -> Vec<String> {
    if content.trim().is_empty() {
        return vec![SUMMARY_UNAVAILABLE.to_string()];
    }

    let flattened = NEWLINES.replace_all(content, " ");
    let bullets: Vec<String> = sentences(&flattened)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_BULLETS)
        .map(str::to_string)
        .collect();

    if bullets.is_empty() {
        let prefix: String = content.chars().take(FALLBACK_PREFIX_CHARS).collect();
        return vec![prefix.trim().to_string()];
    }
    bullets
}
