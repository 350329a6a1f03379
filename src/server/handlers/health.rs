use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let indexed_chunks = state.store.count().await?;
    let active_sessions = state.memory.active_sessions().await;
    Ok(Json(json!({
        "status": "ok",
        "indexed_chunks": indexed_chunks,
        "active_sessions": active_sessions
    })))
}
