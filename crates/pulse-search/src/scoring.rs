//! Deterministic relevance score for a search hit.

const BASE_SCORE: u8 = 60;
const MAX_SCORE: u8 = 99;
const KEYWORD_BONUS: u8 = 10;
const LONG_CONTENT_BONUS: u8 = 5;
const LONG_CONTENT_CHARS: usize = 1000;

/// First word of the topic longer than three characters, lowercased.
#[must_use]
pub fn topic_keyword(topic: &str) -> Option<String> {
    topic
        .split_whitespace()
        .find(|word| word.chars().count() > 3)
        .map(str::to_lowercase)
}

fn source_bonus(source_label: &str) -> u8 {
    let label = source_label.to_lowercase();
    if label.contains("harvard") || label.contains("economist") {
        15
    } else if label.contains("technology") {
        10
    } else if label.contains("bloomberg") {
        5
    } else {
        0
    }
}

/// Score a candidate insight in `[60, 99]`.
///
/// Starts at 60, adds a publisher tier bonus, +10 when the topic keyword
/// appears in the title and +5 for content longer than 1000 characters.
#[must_use]
pub fn score_pulse(topic: &str, title: &str, content: &str, source_label: &str) -> u8 {
    let mut score = BASE_SCORE + source_bonus(source_label);

    if let Some(keyword) = topic_keyword(topic) {
        if title.to_lowercase().contains(&keyword) {
            score += KEYWORD_BONUS;
        }
    }

    if content.chars().count() > LONG_CONTENT_CHARS {
        score += LONG_CONTENT_BONUS;
    }

    score.min(MAX_SCORE)
}
