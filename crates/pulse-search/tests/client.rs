//! Integration tests for `TavilyClient` using wiremock HTTP mocks.

use pulse_search::{SearchError, TavilyClient};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> TavilyClient {
    TavilyClient::with_base_url(Some("test-key".to_string()), 30, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_posts_restricted_query_and_parses_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-Key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "query": "AI regulation",
            "days": 7,
            "max_results": 5,
            "include_domains": ["bloomberg.com", "hbr.org", "technologyreview.com", "economist.com"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {
                    "title": "Regulation is coming",
                    "url": "https://hbr.org/2025/01/regulation",
                    "content": "First. Second.",
                    "published_date": "2025-01-10"
                },
                {
                    "title": "Markets",
                    "url": "https://www.bloomberg.com/x",
                    "content": "Body."
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_client(&server.uri())
        .search("AI regulation")
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://hbr.org/2025/01/regulation");
    assert_eq!(results[0].published_date.as_deref(), Some("2025-01-10"));
    assert!(results[1].published_date.is_none());
}

#[tokio::test]
async fn missing_results_field_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let results = test_client(&server.uri())
        .search("anything")
        .await
        .expect("search should succeed");
    assert!(results.is_empty());
}

#[tokio::test]
async fn server_error_is_http_error_and_soft_search_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, SearchError::Http(_)));
    assert!(client.search_or_empty("anything").await.is_empty());
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, SearchError::Deserialize { .. }));
    assert!(client.search_or_empty("anything").await.is_empty());
}

#[tokio::test]
async fn missing_key_never_calls_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = TavilyClient::with_base_url(None, 30, &server.uri()).expect("client");
    assert!(matches!(
        client.search("anything").await,
        Err(SearchError::MissingApiKey)
    ));
    assert!(client.search_or_empty("anything").await.is_empty());
}
