//! # Course Handlers
//!
//! Outline generation, which creates a course tree, plus the read-only
//! course/module/lesson listings.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::{
    config::COURSE_OUTLINE_TASK,
    types::{CourseIdQuery, ModuleIdQuery},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use edumate::types::{Course, CourseTree, Lesson, LessonListing, Module, OutlineResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

// --- API Payloads ---

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateOutlineRequest {
    pub topic: String,
    pub num_modules: u32,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

// --- Handlers ---

/// Handler for `POST /course/generate-outline`.
pub async fn generate_outline_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<GenerateOutlineRequest>,
) -> Result<Json<ApiResponse<OutlineResult>>, AppError> {
    let topic = payload.topic.trim();
    if topic.is_empty() {
        return Err(AppError::BadRequest("topic must not be empty".to_string()));
    }
    if payload.num_modules == 0 {
        return Err(AppError::BadRequest(
            "num_modules must be at least 1".to_string(),
        ));
    }
    info!(
        "Received outline request: topic='{topic}', num_modules={}",
        payload.num_modules
    );

    let pipeline = app_state.pipeline_for(COURSE_OUTLINE_TASK)?;
    let outline = pipeline
        .generate_outline(topic, payload.num_modules)
        .await?;

    let debug_info = json!({
        "task": COURSE_OUTLINE_TASK,
        "provider": app_state.provider_of(COURSE_OUTLINE_TASK),
        "num_modules_requested": payload.num_modules,
        "num_modules_parsed": outline.parsed_modules.len(),
    });
    Ok(wrap_response(outline, debug_params, Some(debug_info)))
}

/// Handler for `GET /course/list`.
pub async fn list_courses_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ListResponse<Course>>>, AppError> {
    let items = app_state.sqlite_provider.list_courses().await?;
    Ok(wrap_response(ListResponse { items }, debug_params, None))
}

/// Handler for `GET /course/{course_id}`, returning the whole tree.
pub async fn get_course_handler(
    State(app_state): State<AppState>,
    Path(course_id): Path<String>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<CourseTree>>, AppError> {
    let tree = app_state
        .sqlite_provider
        .get_course_tree(&course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course '{course_id}' not found")))?;
    Ok(wrap_response(tree, debug_params, None))
}

/// Handler for `GET /modules?course_id=`.
pub async fn list_modules_handler(
    State(app_state): State<AppState>,
    Query(params): Query<CourseIdQuery>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ListResponse<Module>>>, AppError> {
    let items = app_state
        .sqlite_provider
        .list_modules(&params.course_id)
        .await?;
    Ok(wrap_response(ListResponse { items }, debug_params, None))
}

/// Handler for `GET /lessons?module_id=`.
pub async fn list_lessons_handler(
    State(app_state): State<AppState>,
    Query(params): Query<ModuleIdQuery>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ListResponse<Lesson>>>, AppError> {
    let items = app_state
        .sqlite_provider
        .list_lessons(&params.module_id)
        .await?;
    Ok(wrap_response(ListResponse { items }, debug_params, None))
}

/// Handler for `GET /lesson/list`: every lesson with its module and course names.
pub async fn list_all_lessons_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ListResponse<LessonListing>>>, AppError> {
    let items = app_state.sqlite_provider.list_all_lessons().await?;
    Ok(wrap_response(ListResponse { items }, debug_params, None))
}
