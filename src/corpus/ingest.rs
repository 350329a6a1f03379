use std::path::Path;

use super::chunker::{chunk_document, Chunk, ChunkingConfig};
use super::records::load_corpus;
use super::render::{build_documents, RecordSkip};
use crate::core::errors::ApiError;
use crate::retrieval::store::VectorStore;

/// Outcome of one builder run over a corpus file.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub indexed: usize,
    pub skipped: Vec<RecordSkip>,
}

/// Read the corpus, render and chunk every record, and index the chunks.
///
/// Skipped records are reported, never fatal. Document ids are
/// deterministic, so re-running over the same corpus replaces rows
/// instead of duplicating them.
pub async fn ingest_corpus(
    path: &Path,
    config: &ChunkingConfig,
    store: &dyn VectorStore,
) -> Result<IngestReport, ApiError> {
    let corpus = load_corpus(path)?;
    tracing::info!(
        "Loaded corpus from {} ({} records)",
        path.display(),
        corpus.record_count()
    );

    let built = build_documents(&corpus);
    for skip in &built.skipped {
        tracing::warn!("Skipping {skip}");
    }

    let mut chunks: Vec<Chunk> = Vec::new();
    for document in &built.documents {
        chunks.extend(chunk_document(document, config));
    }

    let documents = built.documents.len();
    let chunk_count = chunks.len();
    let indexed = store.index(chunks).await?;

    tracing::info!(
        "Ingested {} documents into {} chunks ({} records skipped)",
        documents,
        chunk_count,
        built.skipped.len()
    );

    Ok(IngestReport {
        documents,
        chunks: chunk_count,
        indexed,
        skipped: built.skipped,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::retrieval::store::ScoredPassage;

    struct RecordingStore {
        chunks: Mutex<Vec<Chunk>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                chunks: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn index(&self, chunks: Vec<Chunk>) -> Result<usize, ApiError> {
            let count = chunks.len();
            self.chunks.lock().unwrap().extend(chunks);
            Ok(count)
        }

        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<ScoredPassage>, ApiError> {
            Ok(Vec::new())
        }

        async fn count(&self) -> Result<usize, ApiError> {
            Ok(self.chunks.lock().unwrap().len())
        }

        async fn clear(&self) -> Result<usize, ApiError> {
            let mut chunks = self.chunks.lock().unwrap();
            let count = chunks.len();
            chunks.clear();
            Ok(count)
        }
    }

    fn corpus_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn ingests_a_mixed_corpus() {
        let corpus = json!({
            "product_catalog": [{
                "id": "BM-1001",
                "name": "Pressure-Treated Lumber 2x4x8",
                "category": "Lumber",
                "manufacturer": "TimberTech Pro",
                "specifications": {"grade": "No. 2"},
                "applications": ["Deck framing"],
                "technical_details": {"bending_strength": "875 psi"}
            }],
            "safety_documents": [{
                "doc_id": "SD-5001",
                "title": "Safe Handling of Pressure-Treated Lumber",
                "product_id": "BM-1001",
                "content": "Wear gloves and eye protection when cutting."
            }]
        });
        let file = corpus_file(&corpus.to_string());
        let store = RecordingStore::new();

        let report = ingest_corpus(file.path(), &ChunkingConfig::default(), &store)
            .await
            .unwrap();

        assert_eq!(report.documents, 2);
        assert_eq!(report.indexed, report.chunks);
        assert!(report.skipped.is_empty());

        let chunks = store.chunks.lock().unwrap();
        assert!(chunks.iter().any(|c| c.document_id == "product-BM-1001"));
        assert!(chunks
            .iter()
            .any(|c| c.document_id == "safety_document-SD-5001"));
    }

    #[tokio::test]
    async fn reingesting_an_identical_corpus_yields_identical_chunks() {
        let corpus = json!({
            "building_codes": [{
                "code_id": "IRC-R507",
                "title": "Deck Guard Requirements",
                "jurisdiction": "IRC",
                "summary": "Guards are required on decks more than 30 inches above \
                            grade. Openings must reject a 4 inch sphere. Guard height \
                            must be at least 36 inches for residential construction.",
                "applicable_products": ["BM-1001"]
            }],
            "installation_guides": [{
                "guide_id": "IG-4001",
                "title": "Composite Decking Installation",
                "product_id": "BM-2005",
                "content": "Acclimate boards for 48 hours before fastening. Use hidden \
                            fasteners at every joist crossing. Leave a quarter inch gap \
                            at all board ends for seasonal expansion."
            }]
        });
        let config = ChunkingConfig {
            chunk_size: 120,
            chunk_overlap: 30,
            separator: " ".to_string(),
        };
        let file = corpus_file(&corpus.to_string());

        let mut runs = Vec::new();
        for _ in 0..2 {
            let store = RecordingStore::new();
            ingest_corpus(file.path(), &config, &store).await.unwrap();
            let chunks = store.chunks.lock().unwrap();
            runs.push(
                chunks
                    .iter()
                    .map(|chunk| (chunk.id.clone(), chunk.content.clone()))
                    .collect::<Vec<_>>(),
            );
        }

        assert!(runs[0].len() > 2);
        assert_eq!(runs[0], runs[1]);
    }

    #[tokio::test]
    async fn bad_records_are_skipped_not_fatal() {
        let corpus = json!({
            "building_codes": [
                {"code_id": "IRC-R507", "title": "Deck Requirements",
                 "jurisdiction": "IRC", "summary": "Guards required over 30 inches.",
                 "applicable_products": []},
                {"code_id": "IRC-R802"}
            ]
        });
        let file = corpus_file(&corpus.to_string());
        let store = RecordingStore::new();

        let report = ingest_corpus(file.path(), &ChunkingConfig::default(), &store)
            .await
            .unwrap();

        assert_eq!(report.documents, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].to_string().contains("building_code record 1"));
    }

    #[tokio::test]
    async fn missing_corpus_file_is_an_error() {
        let store = RecordingStore::new();
        let result = ingest_corpus(
            std::path::Path::new("/nonexistent/clean_data.json"),
            &ChunkingConfig::default(),
            &store,
        )
        .await;
        assert!(result.is_err());
    }
}
