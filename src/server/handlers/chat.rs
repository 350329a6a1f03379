use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::chat::{ChatMessage, DEFAULT_SESSION_ID};
use crate::state::AppState;

const WELCOME_MESSAGE: &str = "Hello! I'm BuildMate, your building materials assistant. I can help with product specifications, installation procedures, safety guidelines, building codes, pricing and availability, and comparing material options. What are you working on today?";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Run one chat turn. Clients without session handling all share the
/// default session, matching a single-user deployment.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> impl IntoResponse {
    let session_id = payload
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
    let response = state.chat.respond(&session_id, &payload.messages).await;
    Json(response)
}

/// Fixed greeting in the assistant message shape the frontend renders.
pub async fn welcome() -> impl IntoResponse {
    Json(json!({
        "id": Uuid::new_v4().to_string(),
        "role": "assistant",
        "content": WELCOME_MESSAGE,
        "createTime": Utc::now().timestamp_millis(),
        "status": "success"
    }))
}

pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let closed = state.memory.close(&session_id).await;
    Json(json!({"closed": closed}))
}
