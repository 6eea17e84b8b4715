//! Router fixtures: an in-memory store and canned capabilities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use pulse_core::{PostStructure, UserId};
use pulse_pipeline::{
    BlobStore, Capabilities, CapabilityError, GenerationError, ImageGenerator, MemoryStore,
    Pipeline, PostGenerator, SearchProvider, SocialPublisher,
};
use pulse_search::SearchResult;
use tower::ServiceExt;
use uuid::Uuid;

use super::{build_app, AppState};
use crate::middleware::{IdentityConfig, USER_ID_HEADER};

pub struct CannedSearch;

#[async_trait]
impl SearchProvider for CannedSearch {
    async fn search(&self, _query: &str) -> Vec<SearchResult> {
        vec![SearchResult {
            title: "Why regulation matters".into(),
            url: "https://hbr.org/2025/03/regulation".into(),
            content: "Regulators are moving fast. Companies must adapt.".into(),
            published_date: Some("2025-03-01".into()),
        }]
    }
}

pub struct CannedGenerator;

#[async_trait]
impl PostGenerator for CannedGenerator {
    async fn complete_post(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<PostStructure, GenerationError> {
        Ok(PostStructure {
            hook: "Hook.".into(),
            insight_body: "b".repeat(700),
            human_connection: "Umano.".into(),
            open_loop: "Voi cosa ne pensate?".into(),
        })
    }
}

pub struct CannedImages;

#[async_trait]
impl ImageGenerator for CannedImages {
    async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>, CapabilityError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

pub struct CannedBlobs;

#[async_trait]
impl BlobStore for CannedBlobs {
    async fn put(
        &self,
        _key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn public_url(&self, key: &str) -> Option<String> {
        Some(format!("https://cdn.test/{key}"))
    }
}

#[derive(Default)]
pub struct CountingPublisher {
    pub calls: AtomicUsize,
}

#[async_trait]
impl SocialPublisher for CountingPublisher {
    async fn publish(
        &self,
        _access_token: &str,
        _text: &str,
        _image_url: Option<&str>,
    ) -> Result<String, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("urn:li:share:42".into())
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub publisher: Arc<CountingPublisher>,
    pub demo_user: Option<UserId>,
    pub user: UserId,
    state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_demo_user() -> Self {
        Self::build(Some(UserId::new(Uuid::new_v4())))
    }

    fn build(demo_user: Option<UserId>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let publisher = Arc::new(CountingPublisher::default());
        let pipeline = Pipeline::new(Capabilities {
            store: store.clone(),
            search: Arc::new(CannedSearch),
            generator: Arc::new(CannedGenerator),
            images: Arc::new(CannedImages),
            blobs: Arc::new(CannedBlobs),
            publisher: publisher.clone(),
        });
        Self {
            store,
            publisher,
            demo_user,
            user: UserId::new(Uuid::new_v4()),
            state: AppState {
                pipeline: Arc::new(pipeline),
            },
        }
    }

    pub fn router(&self) -> Router {
        build_app(
            self.state.clone(),
            IdentityConfig {
                demo_user: self.demo_user,
            },
        )
    }

    pub fn user_header(&self) -> String {
        self.user.to_string()
    }

    pub fn publisher_calls(&self) -> usize {
        self.publisher.calls.load(Ordering::SeqCst)
    }
}

pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.router()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response")
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json parse")
}
