//! # Prompt Templates
//!
//! Fixed templates for each generation task and the tutor, and the
//! substitution functions that fill them: parameters in, filled strings out.

pub mod tasks;

use crate::{
    errors::EdumateError,
    types::{ArtifactKind, TutorQuestion},
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tasks::*;

/// Stands in for `{topic}` when the learner names none.
pub const DEFAULT_TUTOR_TOPIC: &str = "this subject";
/// Stands in for `{confidence}` when the learner gives none.
pub const DEFAULT_TUTOR_CONFIDENCE: &str = "not stated";

/// The system and user templates for one task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl TaskPrompt {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }
}

/// A filled prompt pair, ready to send to an `AiProvider`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// The full set of templates the pipeline uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptTemplates {
    pub outline: TaskPrompt,
    pub lesson: TaskPrompt,
    pub quiz: TaskPrompt,
    pub flashcards: TaskPrompt,
    pub tutor: TaskPrompt,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            outline: TaskPrompt::new(COURSE_OUTLINE_SYSTEM_PROMPT, COURSE_OUTLINE_USER_PROMPT),
            lesson: TaskPrompt::new(LESSON_CONTENT_SYSTEM_PROMPT, LESSON_CONTENT_USER_PROMPT),
            quiz: TaskPrompt::new(QUIZ_SYSTEM_PROMPT, QUIZ_USER_PROMPT),
            flashcards: TaskPrompt::new(FLASHCARD_SYSTEM_PROMPT, FLASHCARD_USER_PROMPT),
            tutor: TaskPrompt::new(TUTOR_CHAT_SYSTEM_PROMPT, TUTOR_CHAT_USER_PROMPT),
        }
    }
}

impl PromptTemplates {
    pub fn for_artifact(&self, kind: ArtifactKind) -> &TaskPrompt {
        match kind {
            ArtifactKind::Content => &self.lesson,
            ArtifactKind::Quiz => &self.quiz,
            ArtifactKind::Flashcards => &self.flashcards,
        }
    }

    /// Fills the outline template.
    ///
    /// Placeholders: `{topic}`, `{num_modules}`
    pub fn outline_prompt(
        &self,
        topic: &str,
        num_modules: u32,
    ) -> Result<RenderedPrompt, EdumateError> {
        let num_modules = num_modules.to_string();
        render(
            &self.outline,
            &[("topic", topic), ("num_modules", num_modules.as_str())],
        )
    }

    /// Fills the template for `kind` with the lineage's display names.
    ///
    /// Placeholders: `{course_name}`, `{module_name}`, `{lesson_name}`
    pub fn artifact_prompt(
        &self,
        kind: ArtifactKind,
        course_name: &str,
        module_name: &str,
        lesson_name: &str,
    ) -> Result<RenderedPrompt, EdumateError> {
        render(
            self.for_artifact(kind),
            &[
                ("course_name", course_name),
                ("module_name", module_name),
                ("lesson_name", lesson_name),
            ],
        )
    }

    /// Fills the tutor template. A missing topic or confidence is phrased
    /// generically rather than left blank.
    ///
    /// Placeholders: `{topic}`, `{confidence}`, `{question}`
    pub fn tutor_prompt(&self, question: &TutorQuestion) -> Result<RenderedPrompt, EdumateError> {
        let given = |value: &Option<String>, fallback: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        let topic = given(&question.topic, DEFAULT_TUTOR_TOPIC);
        let confidence = given(&question.confidence, DEFAULT_TUTOR_CONFIDENCE);
        render(
            &self.tutor,
            &[
                ("topic", topic.as_str()),
                ("confidence", confidence.as_str()),
                ("question", question.question.trim()),
            ],
        )
    }
}

fn render(task: &TaskPrompt, values: &[(&str, &str)]) -> Result<RenderedPrompt, EdumateError> {
    Ok(RenderedPrompt {
        system: fill(&task.system_prompt, values)?,
        user: fill(&task.user_prompt, values)?,
    })
}

/// Replaces every known `{name}` placeholder in a single pass over `template`.
/// Substituted values are not scanned again, and unknown `{...}` runs are
/// kept as written.
fn fill(template: &str, values: &[(&str, &str)]) -> Result<String, EdumateError> {
    let re = Regex::new(r"\{(?P<name>[a-z_]+)\}")?;
    let filled = re.replace_all(template, |caps: &Captures| {
        values
            .iter()
            .find(|(name, _)| *name == &caps["name"])
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    });
    Ok(filled.into_owned())
}
