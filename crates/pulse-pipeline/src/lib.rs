//! Insight ranking, post generation, image attachment and publishing.
//!
//! Every flow runs against a [`Pipeline`], which holds the record store and
//! the external capabilities behind trait objects. Production wiring uses
//! [`store::PgStore`] and the HTTP clients. The `test-support` feature adds
//! `store::MemoryStore`, an in-process store with failure injection.

pub mod capabilities;
pub mod drafting;
pub mod error;
pub mod ghostwriter;
pub mod image;
pub mod ingest;
pub mod publish;
pub mod settings;
pub mod store;
mod wiring;

use std::sync::Arc;

pub use capabilities::{
    BlobStore, CapabilityError, GenerationError, ImageGenerator, PostGenerator, SearchProvider,
    SocialPublisher,
};
pub use error::PipelineError;
pub use ghostwriter::Ghostwriter;
pub use image::ImageAttachment;
pub use ingest::{rank_insights, today_day_of_week};
pub use publish::{PendingWrite, PublishOutcome, ReconcileQueue, ReconcileReport};
pub use settings::DraftView;
#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryStore;
pub use store::{PgStore, Store, StoreError};
pub use wiring::production_capabilities;

/// The collaborators a [`Pipeline`] needs.
pub struct Capabilities {
    pub store: Arc<dyn Store>,
    pub search: Arc<dyn SearchProvider>,
    pub generator: Arc<dyn PostGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    pub blobs: Arc<dyn BlobStore>,
    pub publisher: Arc<dyn SocialPublisher>,
}

pub struct Pipeline {
    store: Arc<dyn Store>,
    search: Arc<dyn SearchProvider>,
    ghostwriter: Ghostwriter,
    images: Arc<dyn ImageGenerator>,
    blobs: Arc<dyn BlobStore>,
    publisher: Arc<dyn SocialPublisher>,
    reconcile: ReconcileQueue,
}

impl Pipeline {
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self::with_queue(capabilities, ReconcileQueue::default())
    }

    /// Builds a pipeline that shares an existing reconciliation queue.
    #[must_use]
    pub fn with_queue(capabilities: Capabilities, reconcile: ReconcileQueue) -> Self {
        Self {
            store: capabilities.store,
            search: capabilities.search,
            ghostwriter: Ghostwriter::new(capabilities.generator),
            images: capabilities.images,
            blobs: capabilities.blobs,
            publisher: capabilities.publisher,
            reconcile,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    #[must_use]
    pub fn reconcile_queue(&self) -> &ReconcileQueue {
        &self.reconcile
    }
}
