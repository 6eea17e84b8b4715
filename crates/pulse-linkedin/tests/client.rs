//! Integration tests for `LinkedinClient` using wiremock HTTP mocks.

use pulse_linkedin::{LinkedinClient, LinkedinError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> LinkedinClient {
    LinkedinClient::with_base_url(30, base_url).expect("client construction should not fail")
}

async fn mount_userinfo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sub": "member-1",
            "name": "Ada"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn publish_returns_restli_id_header() {
    let server = MockServer::start().await;
    mount_userinfo(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .and(header("X-Restli-Protocol-Version", "2.0.0"))
        .and(body_partial_json(serde_json::json!({
            "author": "urn:li:person:member-1",
            "lifecycleState": "PUBLISHED"
        })))
        .respond_with(
            ResponseTemplate::new(201).insert_header("x-restli-id", "urn:li:share:42"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let id = test_client(&server.uri())
        .publish("tok", "Hello", Some("https://cdn/x.png"))
        .await
        .expect("publish should succeed");
    assert_eq!(id, "urn:li:share:42");
}

#[tokio::test]
async fn publish_falls_back_to_body_id() {
    let server = MockServer::start().await;
    mount_userinfo(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({ "id": "urn:li:ugcPost:7" })),
        )
        .mount(&server)
        .await;

    let id = test_client(&server.uri())
        .publish("tok", "Hello", None)
        .await
        .expect("publish should succeed");
    assert_eq!(id, "urn:li:ugcPost:7");
}

#[tokio::test]
async fn publish_without_any_id_fails() {
    let server = MockServer::start().await;
    mount_userinfo(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .publish("tok", "Hello", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkedinError::MissingPostId));
}

#[tokio::test]
async fn expired_token_surfaces_api_error_without_posting() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Invalid access token"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .publish("tok", "Hello", None)
        .await
        .unwrap_err();
    match err {
        LinkedinError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid access token");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn blank_token_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .publish("   ", "Hello", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkedinError::MissingToken));
}
