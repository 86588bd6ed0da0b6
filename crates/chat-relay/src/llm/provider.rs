//! LLM provider trait.

use async_trait::async_trait;

use super::error::LLMError;
use super::types::{ChatRequest, ChatResponse};

/// A chat completion backend.
///
/// Implementations must be cheap to share: a single instance is built at
/// startup and used concurrently by every request.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Make a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError>;
}
