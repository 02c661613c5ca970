//! Content generator trait and the chat-completions backend

pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::LlmError;
use crate::types::{EmbedRequest, EmbedResponse, GenerationRequest, GenerationResponse, TokenCount};

/// Responses produced incrementally by a streaming generation
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<GenerationResponse, LlmError>> + Send>>;

/// Anything that can serve vendor-neutral generation requests
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Send a request and wait for the complete response
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError>;

    /// Send a request and receive responses as they are produced
    async fn generate_stream(&self, request: &GenerationRequest) -> Result<GenerationStream, LlmError>;

    /// Approximate the token count of a request
    async fn count_tokens(&self, request: &GenerationRequest) -> Result<TokenCount, LlmError>;

    /// Embed contents
    async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, LlmError>;
}
