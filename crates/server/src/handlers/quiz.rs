//! # Quiz Handlers

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
    types::{Quiz, StoredArtifact},
    ArtifactKind,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: String,
    pub points: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub quiz_id: String,
    pub points: i64,
}

/// Handler for `POST /quiz/generate`.
pub async fn generate_quiz_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<LessonLookupRequest>,
) -> Result<Json<ApiResponse<StoredArtifact>>, AppError> {
    generate_artifact(&app_state, ArtifactKind::Quiz, debug_params, payload).await
}

/// Handler for `GET /quiz/count`.
pub async fn quiz_count_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<QuizCountResponse>>, AppError> {
    let count = app_state.sqlite_provider.count_quizzes().await?;
    Ok(wrap_response(QuizCountResponse { count }, debug_params, None))
}

/// Handler for `GET /quiz?lesson_id=`.
pub async fn list_quizzes_handler(
    State(app_state): State<AppState>,
    Query(params): Query<LessonIdQuery>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ListResponse<Quiz>>>, AppError> {
    let items = app_state
        .sqlite_provider
        .list_quizzes(&params.lesson_id)
        .await?;
    Ok(wrap_response(ListResponse { items }, debug_params, None))
}

/// Handler for `POST /quiz/submit`, recording the learner's score.
pub async fn submit_quiz_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<Json<ApiResponse<SubmitQuizResponse>>, AppError> {
    if payload.points < 0 {
        return Err(AppError::BadRequest("points must not be negative".to_string()));
    }
    let updated = app_state
        .sqlite_provider
        .set_quiz_points(&payload.quiz_id, payload.points)
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!(
            "Quiz '{}' not found",
            payload.quiz_id
        )));
    }
    info!("Recorded {} points for quiz {}", payload.points, payload.quiz_id);
    Ok(wrap_response(
        SubmitQuizResponse {
            quiz_id: payload.quiz_id,
            points: payload.points,
        },
        debug_params,
        None,
    ))
}
