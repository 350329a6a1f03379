//! Offline document store builder: corpus records in, indexed chunks out.

pub mod chunker;
pub mod ingest;
pub mod records;
pub mod render;

pub use chunker::{chunk_document, Chunk, ChunkingConfig};
pub use ingest::{ingest_corpus, IngestReport};
pub use records::{load_corpus, Corpus, RecordKind};
pub use render::{build_documents, Document, RecordSkip};
