//! Publisher identification from article URLs.

use reqwest::Url;

/// Domains the search is restricted to, paired with their display label.
/// Order matters: the first matching domain wins.
const SOURCES: &[(&str, &str)] = &[
    ("bloomberg.com", "Bloomberg"),
    ("hbr.org", "Harvard Business Review"),
    ("technologyreview.com", "MIT Technology Review"),
    ("economist.com", "The Economist"),
];

/// Domains passed to the search API as `include_domains`.
pub const ALLOWED_DOMAINS: [&str; 4] = [
    "bloomberg.com",
    "hbr.org",
    "technologyreview.com",
    "economist.com",
];

/// Label used for any host outside the allow-list.
pub const FALLBACK_SOURCE: &str = "Fonte Autorevole";

/// Map an article URL to a human-readable publisher label.
///
/// The host (lowercased, leading `www.` removed) matches a domain when it is
/// the domain itself or one of its subdomains. Unparseable input yields
/// [`FALLBACK_SOURCE`].
#[must_use]
pub fn identify_source(url: &str) -> &'static str {
    let Some(host) = Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    else {
        return FALLBACK_SOURCE;
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);

    SOURCES
        .iter()
        .find(|&&(domain, _)| {
            host == domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
        .map_or(FALLBACK_SOURCE, |&(_, label)| label)
}
