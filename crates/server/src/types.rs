//! Request and response shapes shared across handler modules.

use crate::errors::AppError;
use edumate::LessonLookup;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

/// Identifies the lesson a lesson/quiz/flashcard generation targets.
///
/// `lesson_id` wins over `content_id`, which wins over the name triple.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LessonLookupRequest {
    #[serde(default)]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub module_name: Option<String>,
    #[serde(default)]
    pub lesson_name: Option<String>,
}

impl TryFrom<LessonLookupRequest> for LessonLookup {
    type Error = AppError;

    fn try_from(req: LessonLookupRequest) -> Result<Self, Self::Error> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        if let Some(lesson_id) = present(req.lesson_id) {
            return Ok(LessonLookup::ByLessonId(lesson_id));
        }
        if let Some(content_id) = present(req.content_id) {
            return Ok(LessonLookup::ByContentId(content_id));
        }
        match (
            present(req.course_name),
            present(req.module_name),
            present(req.lesson_name),
        ) {
            (Some(course_name), Some(module_name), Some(lesson_name)) => {
                Ok(LessonLookup::ByNames {
                    course_name,
                    module_name,
                    lesson_name,
                })
            }
            _ => Err(AppError::BadRequest(
                "Provide lesson_id, content_id, or all of course_name, module_name and lesson_name."
                    .to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CourseIdQuery {
    pub course_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ModuleIdQuery {
    pub module_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LessonIdQuery {
    pub lesson_id: String,
}
