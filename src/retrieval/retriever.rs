use std::sync::Arc;

use super::store::{ScoredPassage, VectorStore};
use crate::core::errors::ApiError;

/// Top-k retrieval with a linear-combination re-rank.
///
/// The final score blends the store's vector similarity with a keyword
/// overlap signal: `weight * vector + (1 - weight) * keyword`. An empty
/// store simply yields no passages.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    rerank_weight: f32,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>, rerank_weight: f32) -> Self {
        Self {
            store,
            rerank_weight,
        }
    }

    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>, ApiError> {
        let mut passages = self.store.search(query, k).await?;
        if passages.is_empty() {
            return Ok(passages);
        }

        let weight = self.rerank_weight;
        for passage in &mut passages {
            passage.score =
                weight * passage.score + (1.0 - weight) * keyword_overlap(query, &passage.content);
        }

        passages.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(passages)
    }
}

/// Fraction of query terms appearing in the passage, case-insensitive.
fn keyword_overlap(query: &str, content: &str) -> f32 {
    let query_lower = query.to_lowercase();
    let terms: Vec<&str> = query_lower.split_whitespace().collect();
    if terms.is_empty() {
        return 0.0;
    }

    let content_lower = content.to_lowercase();
    let hits = terms
        .iter()
        .filter(|term| content_lower.contains(*term))
        .count();

    hits as f32 / terms.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::corpus::chunker::Chunk;
    use serde_json::json;

    struct FixedStore {
        passages: Vec<ScoredPassage>,
    }

    #[async_trait]
    impl VectorStore for FixedStore {
        async fn index(&self, _chunks: Vec<Chunk>) -> Result<usize, ApiError> {
            Ok(0)
        }

        async fn search(&self, _query: &str, k: usize) -> Result<Vec<ScoredPassage>, ApiError> {
            let mut passages = self.passages.clone();
            passages.truncate(k);
            Ok(passages)
        }

        async fn count(&self) -> Result<usize, ApiError> {
            Ok(self.passages.len())
        }

        async fn clear(&self) -> Result<usize, ApiError> {
            Ok(0)
        }
    }

    fn passage(id: &str, content: &str, score: f32) -> ScoredPassage {
        ScoredPassage {
            chunk_id: id.to_string(),
            content: content.to_string(),
            metadata: json!({}),
            score,
        }
    }

    #[tokio::test]
    async fn keyword_signal_can_outrank_vector_score() {
        let store = FixedStore {
            passages: vec![
                passage("a", "nothing relevant here", 0.9),
                passage("b", "cedar decking versus composite decking", 0.5),
            ],
        };
        let retriever = Retriever::new(Arc::new(store), 0.3);

        let results = retriever.retrieve("cedar decking", 5).await.unwrap();
        assert_eq!(results[0].chunk_id, "b");
        // a: 0.3 * 0.9 = 0.27, b: 0.3 * 0.5 + 0.7 * 1.0 = 0.85
        assert!((results[0].score - 0.85).abs() < 1e-6);
        assert!((results[1].score - 0.27).abs() < 1e-6);
    }

    #[tokio::test]
    async fn empty_store_is_not_an_error() {
        let retriever = Retriever::new(Arc::new(FixedStore { passages: vec![] }), 0.3);
        let results = retriever.retrieve("anything", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn k_bounds_the_result_count() {
        let store = FixedStore {
            passages: vec![
                passage("a", "plywood", 0.9),
                passage("b", "plywood", 0.8),
                passage("c", "plywood", 0.7),
            ],
        };
        let retriever = Retriever::new(Arc::new(store), 0.3);
        let results = retriever.retrieve("plywood", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn overlap_is_case_insensitive() {
        assert!((keyword_overlap("Cedar Decking", "cedar boards for DECKING") - 1.0).abs() < 1e-6);
        assert_eq!(keyword_overlap("granite", "cedar boards"), 0.0);
        assert_eq!(keyword_overlap("", "anything"), 0.0);
    }
}
