#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared mock providers and fixtures so that the integration tests run
//! without network access and against isolated in-memory databases.

use async_trait::async_trait;
use dotenvy::dotenv;
use edumate::{
    outline::parse_outline,
    providers::{
        ai::AiProvider,
        db::{sqlite::SqliteProvider, storage::CourseStore},
    },
    types::{
        ArtifactPolicy, ChatEntry, Course, Lesson, LessonContent, Module, NewArtifact, NewCourse,
        ParsedOutline,
    },
    EdumateError,
};
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

/// The outline used across the pipeline tests.
pub const REFERENCE_OUTLINE: &str = "Course Title: Intro to X\n\nModule 1: Basics\n- Lesson: What is X\n- Lesson: History of X\n\nModule 2: Advanced\n- Lesson: Deep Dive";

// --- Mock AI Provider for Logic Testing ---
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<(String, String)>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
            fail_with: None,
        }
    }

    /// A provider whose every call fails as an upstream API rejection.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(vec![])
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_history.read().unwrap().len()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, EdumateError> {
        self.call_history
            .write()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        if let Some(message) = &self.fail_with {
            return Err(EdumateError::AiApi(message.clone()));
        }
        if let Some(response) = self.responses.write().unwrap().pop() {
            Ok(response)
        } else {
            Ok("Default mock response".to_string())
        }
    }
}

/// An in-memory provider with the schema applied.
pub async fn new_store() -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create SqliteProvider");
    provider
        .initialize_schema()
        .await
        .expect("Failed to initialize schema");
    provider
}

/// Stores the course tree of `raw_outline` directly, bypassing the AI provider.
pub async fn seed_course(provider: &SqliteProvider, raw_outline: &str) -> Course {
    let parsed = parse_outline(raw_outline);
    let course = NewCourse {
        name: parsed.course_title.clone(),
        topic: Some("X".to_string()),
        overview: raw_outline.to_string(),
        outcomes: "Auto-generated".to_string(),
    };
    provider
        .insert_course_tree(&course, &parsed)
        .await
        .expect("Failed to seed course tree")
}

// --- Store whose writes fail ---

/// Reads go to the wrapped provider; every write fails without touching it.
#[derive(Clone, Debug)]
pub struct FailingWrites {
    pub inner: SqliteProvider,
}

fn write_refused() -> EdumateError {
    EdumateError::StorageOperationFailed("disk is read-only".to_string())
}

#[async_trait]
impl CourseStore for FailingWrites {
    async fn insert_course_tree(
        &self,
        _course: &NewCourse,
        _outline: &ParsedOutline,
    ) -> Result<Course, EdumateError> {
        Err(write_refused())
    }

    async fn find_course_by_key(&self, key: &str) -> Result<Option<Course>, EdumateError> {
        self.inner.find_course_by_key(key).await
    }

    async fn find_module_by_key(
        &self,
        course_id: &str,
        key: &str,
    ) -> Result<Option<Module>, EdumateError> {
        self.inner.find_module_by_key(course_id, key).await
    }

    async fn find_lesson_by_key(
        &self,
        module_id: &str,
        key: &str,
    ) -> Result<Option<Lesson>, EdumateError> {
        self.inner.find_lesson_by_key(module_id, key).await
    }

    async fn get_course(&self, course_id: &str) -> Result<Option<Course>, EdumateError> {
        self.inner.get_course(course_id).await
    }

    async fn get_module(&self, module_id: &str) -> Result<Option<Module>, EdumateError> {
        self.inner.get_module(module_id).await
    }

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<Lesson>, EdumateError> {
        self.inner.get_lesson(lesson_id).await
    }

    async fn get_lesson_content(
        &self,
        content_id: &str,
    ) -> Result<Option<LessonContent>, EdumateError> {
        self.inner.get_lesson_content(content_id).await
    }

    async fn store_artifact(
        &self,
        _artifact: &NewArtifact,
        _policy: ArtifactPolicy,
    ) -> Result<String, EdumateError> {
        Err(write_refused())
    }

    async fn store_chat(&self, _message: &str, _response: &str) -> Result<ChatEntry, EdumateError> {
        Err(write_refused())
    }
}

/// Counts the rows of `table` with a raw query.
pub async fn count_rows(provider: &SqliteProvider, table: &str) -> i64 {
    let conn = provider.db.connect().unwrap();
    let mut rows = conn
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    let row = rows.next().await.unwrap().unwrap();
    match row.get_value(0).unwrap() {
        turso::Value::Integer(n) => n,
        other => panic!("unexpected count value {other:?}"),
    }
}
