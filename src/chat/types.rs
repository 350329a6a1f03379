use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::QueryType;

/// Reply sent when a turn fails anywhere in the pipeline.
pub const FALLBACK_REPLY: &str = "I apologize, but I encountered an error processing your request. Could you please rephrase your question?";

/// One message as the frontend sends it. `id` and `createTime` are
/// client-side bookkeeping and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "createTime")]
    pub create_time: i64,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            id: String::new(),
            create_time: 0,
        }
    }
}

/// Assistant reply in the shape the frontend renders.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(rename = "createTime")]
    pub create_time: i64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn success(content: String, query_type: QueryType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: "assistant".to_string(),
            content,
            create_time: Utc::now().timestamp_millis(),
            status: "success".to_string(),
            query_type: Some(query_type),
            error: None,
        }
    }

    /// Error replies keep the assistant shape so the frontend can render
    /// them inline; the cause travels in `error`, never in `content`.
    pub fn error(message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: "assistant".to_string(),
            content: FALLBACK_REPLY.to_string(),
            create_time: Utc::now().timestamp_millis(),
            status: "error".to_string(),
            query_type: None,
            error: Some(message),
        }
    }
}
