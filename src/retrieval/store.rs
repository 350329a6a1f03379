use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::corpus::chunker::Chunk;

/// One retrieved chunk with its relevance score.
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub chunk_id: String,
    pub content: String,
    pub metadata: Value,
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// embed and persist chunks; returns the number indexed
    async fn index(&self, chunks: Vec<Chunk>) -> Result<usize, ApiError>;

    /// top-k passages by similarity to the query, best first
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>, ApiError>;

    /// number of indexed chunks
    async fn count(&self) -> Result<usize, ApiError>;

    /// remove every indexed chunk; returns the number removed
    async fn clear(&self) -> Result<usize, ApiError>;
}
