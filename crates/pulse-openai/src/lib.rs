//! Client for the OpenAI-compatible chat completion and image generation APIs.
//!
//! Chat completions are requested with a strict JSON schema response format
//! and decoded into [`pulse_core::PostStructure`]. Images are requested as
//! base64 payloads and returned as raw PNG bytes.

pub mod chat;
pub mod client;
pub mod error;
pub mod images;
pub(crate) mod retry;
pub mod types;

pub use chat::post_structure_schema;
pub use client::OpenAiClient;
pub use error::OpenAiError;
