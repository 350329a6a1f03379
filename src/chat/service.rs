//! The chat turn pipeline.
//!
//! One turn runs classify, context build, retrieval, prompt assembly,
//! generation and memory update in order, holding the session permit
//! throughout. Failures anywhere map onto a fallback reply with
//! `status: "error"`; memory is only appended after a successful
//! generation, so an errored turn leaves it untouched.

use std::sync::Arc;

use thiserror::Error;

use crate::chat::context::guidance_for;
use crate::chat::memory::MemoryRegistry;
use crate::chat::prompt::build_prompt;
use crate::chat::types::{ChatMessage, ChatResponse};
use crate::classify::{QueryClassifier, QueryLabel};
use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;
use crate::llm::types::CompletionRequest;
use crate::retrieval::retriever::Retriever;
use crate::retrieval::store::VectorStore;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message list is empty")]
    EmptyInput,
    #[error("retrieval failed: {0}")]
    Retrieval(#[source] ApiError),
    #[error("generation failed: {0}")]
    Generation(#[source] ApiError),
}

pub struct ChatService {
    classifier: QueryClassifier,
    retriever: Retriever,
    memory: Arc<MemoryRegistry>,
    provider: Arc<dyn LlmProvider>,
    chat_model: String,
    temperature: f64,
    top_k: usize,
}

impl ChatService {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        memory: Arc<MemoryRegistry>,
        settings: &Settings,
    ) -> Self {
        Self {
            classifier: QueryClassifier::new(Arc::clone(&provider), &settings.llm),
            retriever: Retriever::new(store, settings.retrieval.rerank_weight),
            memory,
            provider,
            chat_model: settings.llm.chat_model.clone(),
            temperature: settings.llm.temperature,
            top_k: settings.retrieval.top_k,
        }
    }

    /// Run one chat turn for a session. Never fails outward: any error
    /// becomes a fallback reply so callers always get a renderable
    /// assistant message.
    pub async fn respond(&self, session_id: &str, messages: &[ChatMessage]) -> ChatResponse {
        match self.run_turn(session_id, messages).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("Chat turn failed: {}", err);
                ChatResponse::error(err.to_string())
            }
        }
    }

    async fn run_turn(
        &self,
        session_id: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatResponse, ChatError> {
        let query = messages
            .last()
            .map(|message| message.content.clone())
            .ok_or(ChatError::EmptyInput)?;

        tracing::info!("Received query: {}", query);

        // Held until the turn completes so concurrent requests against
        // one session run strictly in order.
        let _turn = self.memory.begin_turn(session_id).await;

        let query_type = self.classifier.classify(&query).await;
        tracing::info!("Query type: {}", query_type.primary_type.as_str());

        let (context, retrieved_docs) = if query_type.primary_type == QueryLabel::Other {
            // Off-topic queries get no domain grounding; the persona
            // alone handles them.
            (String::new(), String::new())
        } else {
            let guidance = guidance_for(query_type.primary_type).to_string();
            let passages = self
                .retriever
                .retrieve(&query, self.top_k)
                .await
                .map_err(ChatError::Retrieval)?;
            let retrieved = passages
                .iter()
                .map(|passage| passage.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            (guidance, retrieved)
        };

        let history = self.memory.history(session_id).await;
        let prompt = build_prompt(&context, &retrieved_docs, &history, &query);

        let request = CompletionRequest::new(prompt).with_temperature(self.temperature);
        let reply = self
            .provider
            .complete(request, &self.chat_model)
            .await
            .map_err(ChatError::Generation)?;

        self.memory
            .append(session_id, query, reply.clone())
            .await;

        Ok(ChatResponse::success(reply, query_type))
    }
}
