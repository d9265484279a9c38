//! # Flashcard Handlers

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
    types::{FlashcardSet, StoredArtifact},
    ArtifactKind,
};

/// Handler for `POST /flashcards/generate`.
pub async fn generate_flashcards_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<LessonLookupRequest>,
) -> Result<Json<ApiResponse<StoredArtifact>>, AppError> {
    generate_artifact(&app_state, ArtifactKind::Flashcards, debug_params, payload).await
}

/// Handler for `GET /flashcards?lesson_id=`.
pub async fn list_flashcards_handler(
    State(app_state): State<AppState>,
    Query(params): Query<LessonIdQuery>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ListResponse<FlashcardSet>>>, AppError> {
    let items = app_state
        .sqlite_provider
        .list_flashcard_sets(&params.lesson_id)
        .await?;
    Ok(wrap_response(ListResponse { items }, debug_params, None))
}
