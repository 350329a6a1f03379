//! SQLite-backed vector store.
//!
//! Stores chunk text, metadata, and serialized embeddings in SQLite and
//! searches by brute-force cosine similarity. Embeddings come from the
//! configured provider, at both index and query time. No external vector
//! database required.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{ScoredPassage, VectorStore};
use crate::core::errors::ApiError;
use crate::corpus::chunker::Chunk;
use crate::llm::provider::LlmProvider;

// Upper bound on inputs per embedding request.
const EMBED_BATCH: usize = 64;

pub struct SqliteVectorStore {
    pool: SqlitePool,
    provider: Arc<dyn LlmProvider>,
    embedding_model: String,
    db_path: PathBuf,
}

impl SqliteVectorStore {
    pub async fn new(
        db_path: PathBuf,
        provider: Arc<dyn LlmProvider>,
        embedding_model: String,
    ) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self {
            pool,
            provider,
            embedding_model,
            db_path,
        };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chunks (
                chunk_id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                metadata TEXT DEFAULT '{}',
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id)")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(())
    }

    /// Serialize embedding to bytes (little-endian f32).
    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    /// Compute cosine similarity between two vectors.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    async fn embed_contents(&self, contents: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        let mut embeddings = Vec::with_capacity(contents.len());
        for batch in contents.chunks(EMBED_BATCH) {
            let mut batch_embeddings =
                self.provider.embed(batch, &self.embedding_model).await?;
            embeddings.append(&mut batch_embeddings);
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn index(&self, chunks: Vec<Chunk>) -> Result<usize, ApiError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embed_contents(&contents).await?;
        if embeddings.len() != chunks.len() {
            return Err(ApiError::Internal(format!(
                "Embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            let blob = Self::serialize_embedding(embedding);
            let metadata_str = serde_json::to_string(&chunk.metadata).unwrap_or_default();

            sqlx::query(
                "INSERT OR REPLACE INTO chunks (chunk_id, document_id, chunk_index, content, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&chunk.id)
            .bind(&chunk.document_id)
            .bind(chunk.index as i64)
            .bind(&chunk.content)
            .bind(&metadata_str)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        tracing::debug!("Indexed {} chunks", chunks.len());
        Ok(chunks.len())
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>, ApiError> {
        let query_embedding = self
            .provider
            .embed(&[query.to_string()], &self.embedding_model)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("Empty embedding response".to_string()))?;

        let rows = sqlx::query("SELECT chunk_id, content, metadata, embedding FROM chunks")
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        let mut scored: Vec<ScoredPassage> = rows
            .iter()
            .filter_map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                if embedding_bytes.is_empty() {
                    return None;
                }
                let stored = Self::deserialize_embedding(&embedding_bytes);
                let score = Self::cosine_similarity(&query_embedding, &stored);

                let metadata_str: String = row.get("metadata");
                let metadata = serde_json::from_str(&metadata_str).unwrap_or_default();

                Some(ScoredPassage {
                    chunk_id: row.get("chunk_id"),
                    content: row.get("content"),
                    metadata,
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(count as usize)
    }

    async fn clear(&self) -> Result<usize, ApiError> {
        let result = sqlx::query("DELETE FROM chunks")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        tracing::info!("Cleared {} chunks from the vector store", result.rows_affected());
        Ok(result.rows_affected() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{CompletionRequest, ResponseFormat};
    use serde_json::json;

    // Embeds by counting topic words, so related texts land near each
    // other without a live endpoint.
    struct StubEmbedder;

    fn embed_text(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = ["safety", "install", "price", "code"]
            .iter()
            .map(|term| lower.matches(term).count() as f32)
            .collect();
        v.push(1.0);
        v
    }

    #[async_trait]
    impl LlmProvider for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
            _model_id: &str,
        ) -> Result<String, ApiError> {
            Err(ApiError::Internal("not available".to_string()))
        }

        async fn complete_structured(
            &self,
            _request: CompletionRequest,
            _model_id: &str,
            _format: ResponseFormat,
        ) -> Result<String, ApiError> {
            Err(ApiError::Internal("not available".to_string()))
        }

        async fn embed(
            &self,
            inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|text| embed_text(text)).collect())
        }
    }

    async fn test_store() -> SqliteVectorStore {
        let tmp = std::env::temp_dir().join(format!(
            "buildmate-store-test-{}.db",
            uuid::Uuid::new_v4()
        ));
        SqliteVectorStore::new(tmp, Arc::new(StubEmbedder), "stub-model".to_string())
            .await
            .unwrap()
    }

    fn chunk(id: &str, content: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            document_id: "doc-1".to_string(),
            index: 0,
            content: content.to_string(),
            metadata: json!({"doc_type": "safety_document"}),
        }
    }

    #[tokio::test]
    async fn index_and_search_ranks_by_similarity() {
        let store = test_store().await;

        store
            .index(vec![
                chunk("c1", "safety safety gloves and goggles for safety"),
                chunk("c2", "install the bracket then install the rail"),
                chunk("c3", "price list and price updates"),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 3);

        let results = store.search("safety gear", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_id, "c1");
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].metadata["doc_type"], "safety_document");
    }

    #[tokio::test]
    async fn reindexing_same_ids_replaces_rows() {
        let store = test_store().await;

        store
            .index(vec![chunk("c1", "safety first")])
            .await
            .unwrap();
        store
            .index(vec![chunk("c1", "safety first, revised")])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let results = store.search("safety", 5).await.unwrap();
        assert_eq!(results[0].content, "safety first, revised");
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = test_store().await;

        store
            .index(vec![chunk("c1", "safety"), chunk("c2", "install")])
            .await
            .unwrap();
        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.search("safety", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_index_call_is_a_no_op() {
        let store = test_store().await;
        assert_eq!(store.index(Vec::new()).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
