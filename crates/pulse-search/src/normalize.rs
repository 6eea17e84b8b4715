//! Maps raw search hits into insight records ready for the store.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::{NewInsight, Topic};

use crate::scoring::score_pulse;
use crate::source::identify_source;
use crate::summary::summary_bullets;
use crate::types::SearchResult;

/// Maximum number of candidates kept from one search.
pub const MAX_RESULTS: usize = 5;

/// Parse an upstream publication date.
///
/// Accepts RFC 3339, RFC 2822 and bare `YYYY-MM-DD` (midnight UTC).
#[must_use]
pub fn parse_published_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Turn search hits for `topic` into [`NewInsight`]s.
///
/// Hits are deduplicated by URL (first occurrence wins) and capped at
/// [`MAX_RESULTS`] in upstream order. No ranking happens here.
#[must_use]
pub fn normalize_results(
    topic: &Topic,
    results: Vec<SearchResult>,
    now: DateTime<Utc>,
) -> Vec<NewInsight> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| {
            let url = r.url.trim();
            !url.is_empty() && seen.insert(url.to_string())
        })
        .take(MAX_RESULTS)
        .map(|r| to_new_insight(topic, r, now))
        .collect()
}

fn to_new_insight(topic: &Topic, result: SearchResult, now: DateTime<Utc>) -> NewInsight {
    let url = result.url.trim().to_string();
    let source = identify_source(&url);
    let published_date = result
        .published_date
        .as_deref()
        .and_then(parse_published_date)
        .unwrap_or(now);

    NewInsight {
        user_id: topic.user_id,
        topic_id: Some(topic.id),
        summary_bullets: summary_bullets(&result.content),
        pulse_score: score_pulse(&topic.title, &result.title, &result.content, source),
        title: result.title,
        url,
        source: source.to_string(),
        published_date: Some(published_date),
        content: Some(result.content).filter(|c| !c.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pulse_core::UserId;
    use uuid::Uuid;

    fn topic(title: &str) -> Topic {
        Topic {
            id: Uuid::new_v4(),
            user_id: UserId::new(Uuid::new_v4()),
            title: title.to_string(),
            day_of_week: 1,
            is_active: true,
        }
    }

    fn hit(url: &str, title: &str, content: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
            published_date: None,
        }
    }

    #[test]
    fn parses_supported_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(parse_published_date("2025-03-04"), Some(expected));
        assert_eq!(
            parse_published_date("2025-03-04T00:00:00Z"),
            Some(expected)
        );
        assert_eq!(
            parse_published_date("Tue, 04 Mar 2025 00:00:00 +0000"),
            Some(expected)
        );
        assert_eq!(parse_published_date("yesterday"), None);
        assert_eq!(parse_published_date(""), None);
    }

    #[test]
    fn maps_fields_and_defaults_date_to_now() {
        let t = topic("AI regulation");
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let out = normalize_results(
            &t,
            vec![hit(
                "https://hbr.org/a",
                "Regulation ahead",
                "First. Second.",
            )],
            now,
        );
        assert_eq!(out.len(), 1);
        let insight = &out[0];
        assert_eq!(insight.user_id, t.user_id);
        assert_eq!(insight.topic_id, Some(t.id));
        assert_eq!(insight.source, "Harvard Business Review");
        assert_eq!(insight.pulse_score, 85);
        assert_eq!(insight.summary_bullets, vec!["First.", "Second."]);
        assert_eq!(insight.published_date, Some(now));
        assert_eq!(insight.content.as_deref(), Some("First. Second."));
    }

    #[test]
    fn empty_content_is_stored_as_none() {
        let out = normalize_results(&topic("x"), vec![hit("https://a.example", "t", "")], Utc::now());
        assert!(out[0].content.is_none());
        assert_eq!(out[0].summary_bullets, vec!["Sintesi non disponibile"]);
    }

    #[test]
    fn dedups_by_url_and_caps_without_sorting() {
        let t = topic("AI regulation");
        let results = vec![
            hit("https://example.com/1", "a", ""),
            hit("https://hbr.org/2", "Regulation", ""),
            hit("https://example.com/1", "dup", ""),
            hit("https://example.com/3", "c", ""),
            hit("https://example.com/4", "d", ""),
            hit("https://example.com/5", "e", ""),
            hit("https://example.com/6", "f", ""),
        ];
        let out = normalize_results(&t, results, Utc::now());
        let urls: Vec<&str> = out.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/1",
                "https://hbr.org/2",
                "https://example.com/3",
                "https://example.com/4",
                "https://example.com/5",
            ]
        );
        assert_eq!(out[0].title, "a");
    }
}
