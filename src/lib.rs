//! BuildMate backend: retrieval-augmented chat over a building
//! materials corpus.
//!
//! The pipeline classifies each query, resolves category guidance,
//! retrieves matching corpus passages from a SQLite vector store and
//! generates an answer through an OpenAI-compatible provider, keeping
//! per-session conversation memory across turns.

pub mod chat;
pub mod classify;
pub mod core;
pub mod corpus;
pub mod llm;
pub mod retrieval;
pub mod server;
pub mod state;
