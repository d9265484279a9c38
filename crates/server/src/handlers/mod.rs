//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `edumate-server`.
//! The handlers are split into sub-modules by resource: courses, lessons,
//! quizzes, flashcards, progress, and the tutor.

pub mod course;
pub mod flashcards;
pub mod general;
pub mod lesson;
pub mod progress;
pub mod quiz;
pub mod tutor;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use course::*;
pub use flashcards::*;
pub use general::*;
pub use lesson::*;
pub use progress::*;
pub use quiz::*;
pub use tutor::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams, LessonLookupRequest},
};
use axum::{extract::Query, Json};
use edumate::{types::StoredArtifact, ArtifactKind, LessonLookup};
use serde_json::{json, Value};
use tracing::info;

/// A shared helper function to wrap a successful result in the standard `ApiResponse`
/// format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}

/// The common body of the lesson, quiz and flashcard generation endpoints.
pub(crate) async fn generate_artifact(
    app_state: &AppState,
    kind: ArtifactKind,
    debug_params: Query<DebugParams>,
    payload: LessonLookupRequest,
) -> Result<Json<ApiResponse<StoredArtifact>>, AppError> {
    let task_name = kind.task_name();
    let lookup = LessonLookup::try_from(payload)?;
    info!("Received {kind} generation request: {lookup:?}");

    let pipeline = app_state.pipeline_for(task_name)?;
    let stored = pipeline.generate_and_store(kind, &lookup).await?;

    let debug_info = json!({
        "task": task_name,
        "provider": app_state.provider_of(task_name),
        "artifact_policy": pipeline.artifact_policy(),
        "lookup": format!("{lookup:?}"),
    });
    Ok(wrap_response(stored, debug_params, Some(debug_info)))
}
