use async_trait::async_trait;

use super::types::{CompletionRequest, ResponseFormat};
use crate::core::errors::ApiError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// chat completion (non-streaming)
    async fn complete(&self, request: CompletionRequest, model_id: &str)
        -> Result<String, ApiError>;

    /// chat completion constrained to a JSON schema; returns the raw JSON text
    async fn complete_structured(
        &self,
        request: CompletionRequest,
        model_id: &str,
        format: ResponseFormat,
    ) -> Result<String, ApiError>;

    /// generate embeddings
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
