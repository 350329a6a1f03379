//! Offline corpus ingestion.
//!
//! Reads the corpus JSON, renders and chunks every record, embeds the
//! chunks through the configured provider and writes them into the
//! vector store. Run before the first server start and after corpus
//! updates.
//!
//! Usage: `ingest [corpus.json] [--query "sanity check query"]`

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};

use buildmate_backend::core::config::{AppPaths, Settings};
use buildmate_backend::core::logging;
use buildmate_backend::corpus::chunker::ChunkingConfig;
use buildmate_backend::corpus::ingest::ingest_corpus;
use buildmate_backend::llm::openai::OpenAiProvider;
use buildmate_backend::retrieval::{SqliteVectorStore, VectorStore};

struct IngestArgs {
    corpus_path: Option<PathBuf>,
    query: Option<String>,
}

fn parse_args(mut args: env::Args) -> anyhow::Result<IngestArgs> {
    let _program = args.next();
    let mut parsed = IngestArgs {
        corpus_path: None,
        query: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--query" => {
                let Some(text) = args.next() else {
                    bail!("--query requires a value");
                };
                parsed.query = Some(text);
            }
            flag if flag.starts_with("--") => bail!("Unknown flag: {}", flag),
            path => {
                if parsed.corpus_path.is_some() {
                    bail!("Only one corpus path may be given");
                }
                parsed.corpus_path = Some(PathBuf::from(path));
            }
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let settings = Settings::load(&paths).context("Failed to load settings")?;
    let args = parse_args(env::args())?;

    let corpus_path = args
        .corpus_path
        .unwrap_or_else(|| settings.corpus_path(&paths));

    let provider = Arc::new(OpenAiProvider::new(
        settings.llm.base_url.clone(),
        settings.llm.api_key.clone(),
    ));
    let store = SqliteVectorStore::new(
        paths.db_path.clone(),
        provider,
        settings.llm.embedding_model.clone(),
    )
    .await
    .context("Failed to open vector store")?;

    let config = ChunkingConfig::from(&settings.ingest);
    let report = ingest_corpus(&corpus_path, &config, &store)
        .await
        .with_context(|| format!("Ingestion failed for '{}'", corpus_path.display()))?;

    println!(
        "Indexed {} chunks from {} documents into {}",
        report.indexed,
        report.documents,
        store.db_path().display()
    );
    if !report.skipped.is_empty() {
        println!("Skipped {} records:", report.skipped.len());
        for skip in &report.skipped {
            println!("  {}", skip);
        }
    }

    if let Some(query) = args.query {
        let hits = store
            .search(&query, settings.retrieval.top_k)
            .await
            .context("Sanity search failed")?;
        println!("Top passages for '{}':", query);
        for hit in hits {
            let preview: String = hit.content.chars().take(80).collect();
            println!("  [{:.3}] {} {}", hit.score, hit.chunk_id, preview);
        }
    }

    Ok(())
}
