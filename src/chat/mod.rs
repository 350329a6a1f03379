//! Conversation layer: session memory, prompt assembly and the chat
//! turn pipeline.

pub mod context;
pub mod memory;
pub mod prompt;
pub mod service;
pub mod types;

pub use memory::{MemoryRegistry, DEFAULT_SESSION_ID};
pub use service::ChatService;
pub use types::{ChatMessage, ChatResponse};
