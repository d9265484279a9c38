use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Courses
        .route(
            "/course/generate-outline",
            post(handlers::generate_outline_handler),
        )
        .route("/course/list", get(handlers::list_courses_handler))
        .route("/course/{course_id}", get(handlers::get_course_handler))
        .route("/modules", get(handlers::list_modules_handler))
        .route("/lessons", get(handlers::list_lessons_handler))
        // Lesson content
        .route("/lesson/list", get(handlers::list_all_lessons_handler))
        .route("/lesson/generate", post(handlers::generate_lesson_handler))
        .route(
            "/lesson-content",
            get(handlers::get_lesson_content_handler),
        )
        .route(
            "/lesson-content/list",
            get(handlers::list_lesson_contents_handler),
        )
        // Quizzes
        .route("/quiz", get(handlers::list_quizzes_handler))
        .route("/quiz/generate", post(handlers::generate_quiz_handler))
        .route("/quiz/count", get(handlers::quiz_count_handler))
        .route("/quiz/submit", post(handlers::submit_quiz_handler))
        // Flashcards
        .route("/flashcards", get(handlers::list_flashcards_handler))
        .route(
            "/flashcards/generate",
            post(handlers::generate_flashcards_handler),
        )
        // Progress
        .route("/progress/update", post(handlers::update_progress_handler))
        .route("/progress/get", post(handlers::get_progress_handler))
        // Tutor
        .route("/tutor/chat", post(handlers::tutor_chat_handler))
        .route("/tutor/history", get(handlers::tutor_history_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
