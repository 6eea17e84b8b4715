pub mod client;
pub mod error;
pub mod normalize;
pub mod scoring;
pub mod source;
pub mod summary;
pub mod types;

pub use client::TavilyClient;
pub use error::SearchError;
pub use normalize::{normalize_results, parse_published_date, MAX_RESULTS};
pub use scoring::{score_pulse, topic_keyword};
pub use source::{identify_source, ALLOWED_DOMAINS, FALLBACK_SOURCE};
pub use summary::summary_bullets;
pub use types::{SearchRequest, SearchResponse, SearchResult};
