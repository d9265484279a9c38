//! # Tutor Handlers
//!
//! One question in, one answer out. Every answered question is kept in the
//! chat history.

use super::{course::ListResponse, wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::config::TUTOR_CHAT_TASK;
use axum::{
    extract::{Query, State},
    Json,
};
use edumate::{types::ChatEntry, TutorQuestion};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// How many exchanges `GET /tutor/history` returns when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Serialize, Deserialize)]
pub struct TutorChatResponse {
    pub chat_id: String,
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// Handler for `POST /tutor/chat`.
pub async fn tutor_chat_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<TutorQuestion>,
) -> Result<Json<ApiResponse<TutorChatResponse>>, AppError> {
    if payload.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".to_string()));
    }
    info!("Received tutor question ({} chars)", payload.question.len());

    let pipeline = app_state.pipeline_for(TUTOR_CHAT_TASK)?;
    let entry = pipeline.chat(&payload).await?;

    let debug_info = json!({
        "task": TUTOR_CHAT_TASK,
        "provider": app_state.provider_of(TUTOR_CHAT_TASK),
    });
    Ok(wrap_response(
        TutorChatResponse {
            chat_id: entry.id,
            response: entry.response,
        },
        debug_params,
        Some(debug_info),
    ))
}

/// Handler for `GET /tutor/history?limit=`: the latest exchanges, newest first.
pub async fn tutor_history_handler(
    State(app_state): State<AppState>,
    Query(params): Query<HistoryQuery>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ListResponse<ChatEntry>>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let items = app_state.sqlite_provider.list_chat_history(limit).await?;
    Ok(wrap_response(ListResponse { items }, debug_params, None))
}
