//! # Lesson Content Handlers

use super::{
    course::ListResponse, generate_artifact, wrap_response, ApiResponse, AppError, AppState,
    DebugParams, LessonLookupRequest,
};
use crate::types::LessonIdQuery;
use axum::{
    extract::{Query, State},
    Json,
};
use edumate::{
    types::{LessonContent, LessonContentListing, StoredArtifact},
    ArtifactKind,
};

/// Handler for `POST /lesson/generate`.
pub async fn generate_lesson_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<LessonLookupRequest>,
) -> Result<Json<ApiResponse<StoredArtifact>>, AppError> {
    generate_artifact(&app_state, ArtifactKind::Content, debug_params, payload).await
}

/// Handler for `GET /lesson-content?lesson_id=`, returning the latest content.
pub async fn get_lesson_content_handler(
    State(app_state): State<AppState>,
    Query(params): Query<LessonIdQuery>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<LessonContent>>, AppError> {
    let content = app_state
        .sqlite_provider
        .latest_lesson_content(&params.lesson_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No content generated yet for lesson '{}'",
                params.lesson_id
            ))
        })?;
    Ok(wrap_response(content, debug_params, None))
}

/// Handler for `GET /lesson-content/list`.
pub async fn list_lesson_contents_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ListResponse<LessonContentListing>>>, AppError> {
    let items = app_state.sqlite_provider.list_lesson_contents().await?;
    Ok(wrap_response(ListResponse { items }, debug_params, None))
}
