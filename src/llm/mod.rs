pub mod openai;
pub mod provider;
pub mod types;

pub use provider::LlmProvider;
pub use types::{CompletionRequest, PromptMessage, ResponseFormat};
