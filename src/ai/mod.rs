//! Generative AI integration
//!
//! [`GenerativeService`] is the seam between callers and Gemini: structured
//! JSON generation, multi-image analysis, and streaming text.
//! [`GenerativeContentClient`] is the real implementation and
//! [`MockGenerativeClient`] the in-memory stand-in for tests.

pub mod gemini;
pub mod image;
pub mod mime;
pub mod mock;
pub mod service;

pub use mock::{MockCall, MockGenerativeClient};
pub use service::GenerativeContentClient;

use crate::schemas::Schema;
use crate::Result;
use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

/// Incremental text chunks from a streaming generation call.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Generates JSON shaped by `schema`. `model` falls back to the
    /// configured default.
    async fn generate_structured_content(
        &self,
        prompt: &str,
        schema: &Schema,
        model: Option<&str>,
    ) -> Result<Value>;

    /// Sends every data-URI image followed by `prompt` and parses the JSON
    /// answer.
    async fn analyze_images(&self, images: &[String], prompt: &str, schema: &Schema)
        -> Result<Value>;

    /// Opens a streaming text call; the caller drives the returned stream.
    async fn stream_text(&self, prompt: &str, system_instruction: &str) -> Result<TextStream>;
}
