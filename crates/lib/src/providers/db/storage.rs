use crate::errors::EdumateError;
use crate::types::{
    ArtifactPolicy, ChatEntry, Course, Lesson, LessonContent, LessonProgress, Module,
    NewArtifact, NewCourse, ParsedOutline, ProgressUpdate,
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// The persistence seam used by the content pipeline.
///
/// Lookups return `Ok(None)` on a miss; `Err` is reserved for storage
/// failures. Writes are atomic: a course tree or an artifact is either
/// fully persisted or not at all.
#[async_trait]
pub trait CourseStore: Send + Sync + DynClone + Debug {
    /// Creates a new course with all modules and lessons of `outline`, in order.
    async fn insert_course_tree(
        &self,
        course: &NewCourse,
        outline: &ParsedOutline,
    ) -> Result<Course, EdumateError>;

    /// Finds the most recently created course whose normalized name equals `key`.
    async fn find_course_by_key(&self, key: &str) -> Result<Option<Course>, EdumateError>;

    async fn find_module_by_key(
        &self,
        course_id: &str,
        key: &str,
    ) -> Result<Option<Module>, EdumateError>;

    async fn find_lesson_by_key(
        &self,
        module_id: &str,
        key: &str,
    ) -> Result<Option<Lesson>, EdumateError>;

    async fn get_course(&self, course_id: &str) -> Result<Option<Course>, EdumateError>;

    async fn get_module(&self, module_id: &str) -> Result<Option<Module>, EdumateError>;

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<Lesson>, EdumateError>;

    async fn get_lesson_content(
        &self,
        content_id: &str,
    ) -> Result<Option<LessonContent>, EdumateError>;

    /// Persists `artifact` and returns the new row's id.
    async fn store_artifact(
        &self,
        artifact: &NewArtifact,
        policy: ArtifactPolicy,
    ) -> Result<String, EdumateError>;

    /// Records one tutor exchange and returns the stored entry.
    async fn store_chat(&self, message: &str, response: &str) -> Result<ChatEntry, EdumateError>;
}

dyn_clone::clone_trait_object!(CourseStore);

/// Lesson progress keyed by (user, course, module, lesson).
#[async_trait]
pub trait ProgressStore: Send + Sync + Debug {
    /// Inserts or replaces the progress value for one lesson.
    async fn upsert_progress(&self, update: &ProgressUpdate) -> Result<(), EdumateError>;

    /// All recorded lesson progress of a user within a course.
    async fn get_progress(
        &self,
        user_email: &str,
        course_id: &str,
    ) -> Result<Vec<LessonProgress>, EdumateError>;
}
