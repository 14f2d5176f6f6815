//! AI service integration for caption generation
//!
//! Provides the caption flow boundary plus Gemini and OpenAI clients that
//! submit an image and a templated prompt and validate the structured reply.

pub mod gemini;
pub mod mock;
pub mod openai;

pub use gemini::GeminiCaptionClient;
pub use mock::MockCaptionClient;
pub use openai::OpenAiCaptionClient;

use crate::models::{CaptionRequest, CaptionResponse};
use crate::Result;
use async_trait::async_trait;

/// The caption generation flow boundary.
///
/// Implementations validate the request, build the prompt, call the model,
/// and check the reply shape. A conformant reply is returned verbatim; there
/// is no retry and no partial result.
#[async_trait]
pub trait CaptionService: Send + Sync {
    async fn generate_captions(&self, request: &CaptionRequest) -> Result<CaptionResponse>;
}
