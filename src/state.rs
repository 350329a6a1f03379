use std::sync::Arc;

use thiserror::Error;

use crate::chat::{ChatService, MemoryRegistry};
use crate::core::config::{AppPaths, Settings};
use crate::llm::openai::OpenAiProvider;
use crate::llm::provider::LlmProvider;
use crate::retrieval::{SqliteVectorStore, VectorStore};

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load settings: {0}")]
    Settings(#[source] anyhow::Error),

    #[error("Failed to initialize vector store: {0}")]
    VectorStore(#[source] anyhow::Error),
}

/// Global application state shared across all routes.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub store: Arc<dyn VectorStore>,
    pub memory: Arc<MemoryRegistry>,
    pub chat: ChatService,
}

impl AppState {
    /// Initializes the application state: paths and settings, the LLM
    /// provider, the vector store, session memory and the chat pipeline.
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let settings =
            Settings::load(&paths).map_err(|e| InitializationError::Settings(e.into()))?;

        let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
            settings.llm.base_url.clone(),
            settings.llm.api_key.clone(),
        ));

        let store: Arc<dyn VectorStore> = Arc::new(
            SqliteVectorStore::new(
                paths.db_path.clone(),
                Arc::clone(&provider),
                settings.llm.embedding_model.clone(),
            )
            .await
            .map_err(|e| InitializationError::VectorStore(e.into()))?,
        );

        let memory = Arc::new(MemoryRegistry::from_settings(&settings.memory));
        let chat = ChatService::new(provider, Arc::clone(&store), Arc::clone(&memory), &settings);

        Ok(Arc::new(AppState {
            paths,
            settings,
            store,
            memory,
            chat,
        }))
    }
}
