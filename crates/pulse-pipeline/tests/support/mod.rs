//! In-process fakes for the pipeline's external capabilities.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pulse_core::{PostDraft, PostStatus, PostStructure, Profile, UserId};
use pulse_pipeline::{
    BlobStore, Capabilities, CapabilityError, GenerationError, ImageGenerator, MemoryStore,
    Pipeline, PostGenerator, SearchProvider, SocialPublisher,
};
use pulse_search::SearchResult;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeSearch {
    pub results: Mutex<Vec<SearchResult>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn set_results(&self, results: Vec<SearchResult>) {
        *self.results.lock().unwrap() = results;
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results.lock().unwrap().clone()
    }
}

/// Returns queued outputs in order, then repeats `fallback`.
pub struct FakeGenerator {
    pub queued: Mutex<Vec<Result<PostStructure, GenerationError>>>,
    pub fallback: PostStructure,
    pub prompts: Mutex<Vec<String>>,
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self {
            queued: Mutex::new(Vec::new()),
            fallback: post_of_len(900),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl FakeGenerator {
    pub fn queue(&self, output: Result<PostStructure, GenerationError>) {
        self.queued.lock().unwrap().push(output);
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostGenerator for FakeGenerator {
    async fn complete_post(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
    ) -> Result<PostStructure, GenerationError> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        let mut queued = self.queued.lock().unwrap();
        if queued.is_empty() {
            Ok(self.fallback.clone())
        } else {
            queued.remove(0)
        }
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub fail: AtomicBool,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, CapabilityError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(CapabilityError("image API returned 500".into()));
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

#[derive(Default)]
pub struct FakeBlobs {
    pub fail: AtomicBool,
    pub no_public_url: AtomicBool,
    pub puts: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl BlobStore for FakeBlobs {
    async fn put(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), CapabilityError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CapabilityError("storage returned 403".into()));
        }
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> Option<String> {
        if self.no_public_url.load(Ordering::SeqCst) {
            return None;
        }
        Some(format!("https://cdn.test/post_images/{key}"))
    }
}

#[derive(Default)]
pub struct FakePublisher {
    pub fail: AtomicBool,
    pub delay_ms: AtomicU64,
    pub calls: Mutex<Vec<(String, String, Option<String>)>>,
}

impl FakePublisher {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SocialPublisher for FakePublisher {
    async fn publish(
        &self,
        access_token: &str,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<String, CapabilityError> {
        self.calls.lock().unwrap().push((
            access_token.to_string(),
            text.to_string(),
            image_url.map(str::to_string),
        ));
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(CapabilityError("linkedin returned 401".into()));
        }
        Ok("urn:li:share:7000".to_string())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub search: Arc<FakeSearch>,
    pub generator: Arc<FakeGenerator>,
    pub images: Arc<FakeImages>,
    pub blobs: Arc<FakeBlobs>,
    pub publisher: Arc<FakePublisher>,
    pub pipeline: Arc<Pipeline>,
    pub user: UserId,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let search = Arc::new(FakeSearch::default());
        let generator = Arc::new(FakeGenerator::default());
        let images = Arc::new(FakeImages::default());
        let blobs = Arc::new(FakeBlobs::default());
        let publisher = Arc::new(FakePublisher::default());
        let pipeline = Arc::new(Pipeline::new(Capabilities {
            store: store.clone(),
            search: search.clone(),
            generator: generator.clone(),
            images: images.clone(),
            blobs: blobs.clone(),
            publisher: publisher.clone(),
        }));
        Self {
            store,
            search,
            generator,
            images,
            blobs,
            publisher,
            pipeline,
            user: UserId::new(Uuid::new_v4()),
        }
    }

    pub fn link_linkedin(&self) {
        self.store.seed_profile(Profile {
            role: Some("CTO".into()),
            linkedin_access_token: Some("tok-123".into()),
            ..Profile::empty(self.user)
        });
    }

    pub fn seed_draft(&self, generated: &str, edited: Option<&str>, status: PostStatus) -> Uuid {
        let id = Uuid::new_v4();
        self.store.seed_draft(PostDraft {
            id,
            user_id: self.user,
            topic_id: None,
            insight_ids: vec![],
            generated_text: generated.to_string(),
            edited_text: edited.map(str::to_string),
            status,
            linkedin_post_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }
}

pub fn result(title: &str, url: &str, content: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: url.to_string(),
        content: content.to_string(),
        published_date: Some("2025-03-01".to_string()),
    }
}

/// A post whose assembled length is exactly `total` characters.
pub fn post_of_len(total: usize) -> PostStructure {
    PostStructure {
        hook: "h".to_string(),
        insight_body: "b".repeat(total - 9),
        human_connection: "c".to_string(),
        open_loop: "?".to_string(),
    }
}
