//! # Progress Handlers
//!
//! Lesson progress is a percentage per (user, course, module, lesson).

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Query, State},
    Json,
};
use edumate::{
    providers::db::storage::ProgressStore,
    types::{LessonProgress, ProgressUpdate},
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProgressResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetProgressRequest {
    pub user_email: String,
    pub course_id: String,
}

#[derive(Debug, Serialize)]
pub struct GetProgressResponse {
    pub progress_data: Vec<LessonProgress>,
}

/// Handler for `POST /progress/update`.
pub async fn update_progress_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ProgressUpdate>,
) -> Result<Json<ApiResponse<UpdateProgressResponse>>, AppError> {
    if !(0.0..=100.0).contains(&payload.progress) {
        return Err(AppError::BadRequest(format!(
            "progress must be between 0 and 100, got {}",
            payload.progress
        )));
    }
    if payload.user_email.trim().is_empty() {
        return Err(AppError::BadRequest("user_email must not be empty".to_string()));
    }

    app_state.sqlite_provider.upsert_progress(&payload).await?;
    info!(
        "Progress for {} on lesson {} set to {}",
        payload.user_email, payload.lesson_id, payload.progress
    );
    Ok(wrap_response(
        UpdateProgressResponse { updated: true },
        debug_params,
        None,
    ))
}

/// Handler for `POST /progress/get`.
pub async fn get_progress_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<GetProgressRequest>,
) -> Result<Json<ApiResponse<GetProgressResponse>>, AppError> {
    let progress_data = app_state
        .sqlite_provider
        .get_progress(&payload.user_email, &payload.course_id)
        .await?;
    Ok(wrap_response(
        GetProgressResponse { progress_data },
        debug_params,
        None,
    ))
}
