//! # Domain Types
//!
//! The Course → Module → Lesson tree, the artifacts generated for a lesson,
//! and the request/response shapes the pipeline works with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Persisted tree ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: String,
    /// Display name, exactly as parsed from the outline.
    pub name: String,
    pub topic: Option<String>,
    /// The raw outline text the course was built from.
    pub overview: String,
    pub outcomes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    pub id: String,
    pub course_id: String,
    /// Zero-based position among the course's modules, in outline order.
    pub position: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub module_id: String,
    /// Zero-based position among the module's lessons, in outline order.
    pub position: i64,
    pub name: String,
}

/// A fully resolved Course → Module → Lesson chain.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Lineage {
    pub course: Course,
    pub module: Module,
    pub lesson: Lesson,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModuleTree {
    #[serde(flatten)]
    pub module: Module,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CourseTree {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleTree>,
}

/// The fields needed to create a course row; ids and timestamps are assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewCourse {
    pub name: String,
    pub topic: Option<String>,
    pub overview: String,
    pub outcomes: String,
}

// --- Artifacts ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LessonContent {
    pub id: String,
    pub lesson_id: String,
    pub course_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    pub id: String,
    pub lesson_id: String,
    pub raw_text: String,
    pub questions: Vec<QuizQuestion>,
    pub points: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 1 (easy) to 5 (hard), when known.
    #[serde(default)]
    pub difficulty: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlashcardSet {
    pub id: String,
    pub lesson_id: String,
    pub raw_text: String,
    pub cards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
}

/// A typed artifact ready to be written, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NewArtifact {
    Content {
        lesson_id: String,
        course_id: String,
        content: String,
    },
    Quiz {
        lesson_id: String,
        raw_text: String,
        questions: Vec<QuizQuestion>,
    },
    Flashcards {
        lesson_id: String,
        raw_text: String,
        cards: Vec<Flashcard>,
    },
}

impl NewArtifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            NewArtifact::Content { .. } => ArtifactKind::Content,
            NewArtifact::Quiz { .. } => ArtifactKind::Quiz,
            NewArtifact::Flashcards { .. } => ArtifactKind::Flashcards,
        }
    }

    pub fn lesson_id(&self) -> &str {
        match self {
            NewArtifact::Content { lesson_id, .. }
            | NewArtifact::Quiz { lesson_id, .. }
            | NewArtifact::Flashcards { lesson_id, .. } => lesson_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Content,
    Quiz,
    Flashcards,
}

impl ArtifactKind {
    /// The name of the configurable task that produces this artifact.
    pub fn task_name(&self) -> &'static str {
        match self {
            ArtifactKind::Content => "lesson_content",
            ArtifactKind::Quiz => "quiz_generation",
            ArtifactKind::Flashcards => "flashcard_generation",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Content => "content",
            ArtifactKind::Quiz => "quiz",
            ArtifactKind::Flashcards => "flashcards",
        };
        f.write_str(name)
    }
}

/// What a new generation does to the lesson's earlier artifacts of the same kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactPolicy {
    /// Keep every generation as its own row.
    #[default]
    Append,
    /// Delete the lesson's previous rows of that kind before inserting.
    Overwrite,
}

impl FromStr for ArtifactPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(ArtifactPolicy::Append),
            "overwrite" => Ok(ArtifactPolicy::Overwrite),
            other => Err(format!(
                "unknown artifact policy '{other}', expected 'append' or 'overwrite'"
            )),
        }
    }
}

// --- Lookups ---

/// How the caller identifies the lesson an artifact is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonLookup {
    /// Through an existing lesson content row, as the quiz and flashcard screens do.
    ByContentId(String),
    ByLessonId(String),
    /// Normalized, case-insensitive name matching on each level.
    ByNames {
        course_name: String,
        module_name: String,
        lesson_name: String,
    },
}

/// The level of the lineage a lookup failed to resolve.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LookupLevel {
    Content,
    Course,
    Module,
    Lesson,
}

impl fmt::Display for LookupLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupLevel::Content => "lesson content",
            LookupLevel::Course => "course",
            LookupLevel::Module => "module",
            LookupLevel::Lesson => "lesson",
        };
        f.write_str(name)
    }
}

/// Normalizes a display name into the key used for name lookups:
/// trimmed, lowercased, and with internal whitespace runs collapsed to one space.
pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// --- Outline ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedModule {
    pub module_name: String,
    pub lessons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedOutline {
    pub course_title: String,
    pub modules: Vec<ParsedModule>,
}

// --- Pipeline results ---

#[derive(Debug, Clone, Serialize)]
pub struct OutlineResult {
    pub course_id: String,
    pub course_name: String,
    pub outline_text: String,
    pub parsed_modules: Vec<ParsedModule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredArtifact {
    pub artifact_id: String,
    pub kind: ArtifactKind,
    /// The raw generated text, as returned by the AI provider.
    pub text: String,
    pub lesson_id: String,
    pub module_id: String,
    pub course_id: String,
    pub course_name: String,
    pub module_name: String,
    pub lesson_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuizQuestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flashcards: Option<Vec<Flashcard>>,
}

// --- Listings ---

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LessonListing {
    pub lesson_id: String,
    pub lesson_name: String,
    pub module_id: String,
    pub module_name: String,
    pub course_id: String,
    pub course_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LessonContentListing {
    pub content_id: String,
    pub lesson_id: String,
    pub course_id: String,
    pub content: String,
    pub lesson_name: String,
    pub module_name: String,
    pub course_name: String,
}

// --- Progress ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressUpdate {
    pub user_email: String,
    pub course_id: String,
    pub module_id: String,
    pub lesson_id: String,
    /// Completion percentage, 0 to 100.
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LessonProgress {
    pub module_id: String,
    pub lesson_id: String,
    pub progress: f64,
    pub updated_at: DateTime<Utc>,
}

// --- Tutor chat ---

/// A learner's question to the tutor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TutorQuestion {
    pub question: String,
    /// How sure the learner feels, in their own words ("low", "shaky", ...).
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatEntry {
    pub id: String,
    /// The learner's question, as asked.
    pub message: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}
