//! # Edumate
//!
//! Course generation core: turns an LLM-written outline into a stored
//! course/module/lesson tree, then generates lesson content, quizzes, and
//! flashcards for individual lessons on demand.
//!
//! The AI provider and the store are trait objects (`AiProvider`,
//! `CourseStore`), so the pipeline can run against Gemini, a local
//! OpenAI-compatible endpoint, or a test double.

pub mod artifacts;
pub mod errors;
pub mod outline;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::{EdumateError, GenerationError};
pub use outline::parse_outline;
pub use pipeline::{CoursePipeline, CoursePipelineBuilder};
pub use prompts::{PromptTemplates, TaskPrompt};
pub use types::{ArtifactKind, ArtifactPolicy, LessonLookup, LookupLevel, TutorQuestion};
