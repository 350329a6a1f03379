//! Prompt assembly for the chat turn.
//!
//! The system message is the fixed persona plus optional labeled
//! sections for category guidance and retrieved passages. All spliced
//! text is opaque data: nothing is re-parsed as template syntax, so
//! brace characters in corpus content need no escaping.

use crate::chat::memory::ConversationTurn;
use crate::llm::types::PromptMessage;

pub const PERSONA: &str = "You are BuildMate, an expert building materials assistant. Your purpose is to help contractors and builders make informed decisions about construction materials and projects.
Core Capabilities:
1. Provide detailed technical specifications and material recommendations
2. Assist with project planning and material quantity estimation
3. Explain building codes and compliance requirements
4. Answer questions about material properties and installation procedures
5. Suggest cost-effective alternatives while maintaining quality standards

Response Guidelines:
- Base answers on verified technical specifications and building codes
- Consider cost-performance tradeoffs in recommendations
- Include relevant safety guidelines and best practices
- Maintain context awareness across multi-turn conversations
- Be concise and to the point within one paragraph
- Not use symbols like #, *, etc.
- Not use markdown formatting like bold, italics, etc.";

const CONTEXT_HEADER: &str = "Some context might be useful:";
const RETRIEVED_HEADER: &str = "Some information might be useful from Retrieved Documentation:";

/// Build the full message list for one turn: system message, prior
/// turns as user/assistant pairs, then the active query. Empty context
/// or retrieved text drops the matching section entirely.
pub fn build_prompt(
    context: &str,
    retrieved_docs: &str,
    history: &[ConversationTurn],
    query: &str,
) -> Vec<PromptMessage> {
    let mut system = String::from(PERSONA);
    if !context.is_empty() {
        system.push_str("\n\n");
        system.push_str(CONTEXT_HEADER);
        system.push('\n');
        system.push_str(context);
    }
    if !retrieved_docs.is_empty() {
        system.push_str("\n\n");
        system.push_str(RETRIEVED_HEADER);
        system.push('\n');
        system.push_str(retrieved_docs);
    }

    let mut messages = Vec::with_capacity(2 + history.len() * 2);
    messages.push(PromptMessage::system(system));
    for turn in history {
        messages.push(PromptMessage::user(&turn.input));
        messages.push(PromptMessage::assistant(&turn.output));
    }
    messages.push(PromptMessage::user(query));
    messages
}
