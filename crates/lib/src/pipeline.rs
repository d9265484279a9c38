//! # Course Content Pipeline
//!
//! Resolves a lesson, asks the configured `AiProvider` for one artifact,
//! and hands the typed result to the `CourseStore`. Outline generation
//! lives here too since it is the only path that creates course trees, as
//! does the tutor, which answers one question and records the exchange.

use crate::{
    artifacts::{parse_flashcards, parse_quiz},
    errors::{EdumateError, GenerationError},
    outline::parse_outline,
    prompts::PromptTemplates,
    providers::{ai::AiProvider, db::storage::CourseStore},
    types::{
        name_key, ArtifactKind, ArtifactPolicy, ChatEntry, Lineage, LessonLookup, LookupLevel,
        NewArtifact, NewCourse, OutlineResult, StoredArtifact, TutorQuestion,
    },
};
use tracing::{debug, info, warn};

/// Placeholder stored as a generated course's learning outcomes.
pub const AUTO_GENERATED_OUTCOMES: &str = "Auto-generated";

/// Runs generation requests against one AI provider and one store.
#[derive(Debug, Clone)]
pub struct CoursePipeline {
    ai_provider: Box<dyn AiProvider>,
    store: Box<dyn CourseStore>,
    templates: PromptTemplates,
    artifact_policy: ArtifactPolicy,
}

/// A builder for `CoursePipeline`.
#[derive(Default)]
pub struct CoursePipelineBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    store: Option<Box<dyn CourseStore>>,
    templates: Option<PromptTemplates>,
    artifact_policy: ArtifactPolicy,
}

impl CoursePipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    pub fn store(mut self, store: Box<dyn CourseStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the built-in prompt templates.
    pub fn templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Whether a new artifact replaces the lesson's previous ones of the same kind.
    pub fn artifact_policy(mut self, policy: ArtifactPolicy) -> Self {
        self.artifact_policy = policy;
        self
    }

    pub fn build(self) -> Result<CoursePipeline, EdumateError> {
        let ai_provider = self
            .ai_provider
            .ok_or_else(|| EdumateError::MissingAiProvider("no provider was set".to_string()))?;
        let store = self.store.ok_or(EdumateError::MissingStore)?;
        Ok(CoursePipeline {
            ai_provider,
            store,
            templates: self.templates.unwrap_or_default(),
            artifact_policy: self.artifact_policy,
        })
    }
}

impl CoursePipeline {
    pub fn builder() -> CoursePipelineBuilder {
        CoursePipelineBuilder::new()
    }

    pub fn artifact_policy(&self) -> ArtifactPolicy {
        self.artifact_policy
    }

    /// Generates an outline for `topic` and stores it as a new course tree.
    ///
    /// Every call creates a new course, even when one with the same title exists.
    pub async fn generate_outline(
        &self,
        topic: &str,
        num_modules: u32,
    ) -> Result<OutlineResult, GenerationError> {
        let prompt = self.templates.outline_prompt(topic, num_modules)?;
        info!("[generate_outline] Requesting outline for topic '{topic}' ({num_modules} modules).");
        debug!("[generate_outline] User prompt: {}", prompt.user);
        let outline_text = self.ai_provider.generate(&prompt.system, &prompt.user).await?;
        debug!("[generate_outline] Raw response: {outline_text}");

        if outline_text.trim().is_empty() {
            warn!("[generate_outline] Provider returned an empty outline for '{topic}'.");
            return Err(GenerationError::EmptyOutline);
        }

        let parsed = parse_outline(&outline_text);
        debug!(
            "[generate_outline] Parsed '{}' with {} modules.",
            parsed.course_title,
            parsed.modules.len()
        );

        let new_course = NewCourse {
            name: parsed.course_title.clone(),
            topic: Some(topic.to_string()),
            overview: outline_text.clone(),
            outcomes: AUTO_GENERATED_OUTCOMES.to_string(),
        };
        let course = self.store.insert_course_tree(&new_course, &parsed).await?;

        Ok(OutlineResult {
            course_id: course.id,
            course_name: course.name,
            outline_text,
            parsed_modules: parsed.modules,
        })
    }

    /// Resolves the full course/module/lesson lineage of `lookup`.
    ///
    /// The first level that does not resolve is reported in `NotFound`.
    pub async fn resolve_lineage(&self, lookup: &LessonLookup) -> Result<Lineage, GenerationError> {
        match lookup {
            LessonLookup::ByContentId(content_id) => {
                let content = self
                    .store
                    .get_lesson_content(content_id)
                    .await?
                    .ok_or(GenerationError::NotFound(LookupLevel::Content))?;
                self.lineage_of_lesson(&content.lesson_id).await
            }
            LessonLookup::ByLessonId(lesson_id) => self.lineage_of_lesson(lesson_id).await,
            LessonLookup::ByNames {
                course_name,
                module_name,
                lesson_name,
            } => {
                let course = self
                    .store
                    .find_course_by_key(&name_key(course_name))
                    .await?
                    .ok_or(GenerationError::NotFound(LookupLevel::Course))?;
                let module = self
                    .store
                    .find_module_by_key(&course.id, &name_key(module_name))
                    .await?
                    .ok_or(GenerationError::NotFound(LookupLevel::Module))?;
                let lesson = self
                    .store
                    .find_lesson_by_key(&module.id, &name_key(lesson_name))
                    .await?
                    .ok_or(GenerationError::NotFound(LookupLevel::Lesson))?;
                Ok(Lineage {
                    course,
                    module,
                    lesson,
                })
            }
        }
    }

    async fn lineage_of_lesson(&self, lesson_id: &str) -> Result<Lineage, GenerationError> {
        let lesson = self
            .store
            .get_lesson(lesson_id)
            .await?
            .ok_or(GenerationError::NotFound(LookupLevel::Lesson))?;
        let module = self
            .store
            .get_module(&lesson.module_id)
            .await?
            .ok_or(GenerationError::NotFound(LookupLevel::Module))?;
        let course = self
            .store
            .get_course(&module.course_id)
            .await?
            .ok_or(GenerationError::NotFound(LookupLevel::Course))?;
        Ok(Lineage {
            course,
            module,
            lesson,
        })
    }

    /// Generates one artifact of `kind` for the lesson identified by `lookup`
    /// and persists it according to the pipeline's artifact policy.
    ///
    /// The provider is called exactly once, and only after the lesson resolves.
    /// An empty or whitespace-only response persists nothing.
    pub async fn generate_and_store(
        &self,
        kind: ArtifactKind,
        lookup: &LessonLookup,
    ) -> Result<StoredArtifact, GenerationError> {
        let lineage = match self.resolve_lineage(lookup).await {
            Ok(lineage) => lineage,
            Err(e) => {
                info!("[generate_and_store] {kind} request not resolved: {e}");
                return Err(e);
            }
        };
        let Lineage {
            course,
            module,
            lesson,
        } = lineage;

        let prompt = self
            .templates
            .artifact_prompt(kind, &course.name, &module.name, &lesson.name)?;
        info!(
            "[generate_and_store] Generating {kind} for '{}' / '{}' / '{}'.",
            course.name, module.name, lesson.name
        );
        debug!("[generate_and_store] User prompt: {}", prompt.user);
        let text = self.ai_provider.generate(&prompt.system, &prompt.user).await?;
        debug!("[generate_and_store] Raw response: {text}");

        if text.trim().is_empty() {
            warn!("[generate_and_store] Provider returned empty {kind} for lesson {}.", lesson.id);
            return Err(GenerationError::EmptyGeneration(kind));
        }

        let (artifact, questions, flashcards) = match kind {
            ArtifactKind::Content => (
                NewArtifact::Content {
                    lesson_id: lesson.id.clone(),
                    course_id: course.id.clone(),
                    content: text.clone(),
                },
                None,
                None,
            ),
            ArtifactKind::Quiz => {
                let questions = parse_quiz(&text);
                debug!("[generate_and_store] Parsed {} quiz questions.", questions.len());
                (
                    NewArtifact::Quiz {
                        lesson_id: lesson.id.clone(),
                        raw_text: text.clone(),
                        questions: questions.clone(),
                    },
                    Some(questions),
                    None,
                )
            }
            ArtifactKind::Flashcards => {
                let cards = parse_flashcards(&text);
                debug!("[generate_and_store] Parsed {} flashcards.", cards.len());
                (
                    NewArtifact::Flashcards {
                        lesson_id: lesson.id.clone(),
                        raw_text: text.clone(),
                        cards: cards.clone(),
                    },
                    None,
                    Some(cards),
                )
            }
        };

        let artifact_id = self
            .store
            .store_artifact(&artifact, self.artifact_policy)
            .await?;
        info!("[generate_and_store] Stored {kind} {artifact_id} for lesson {}.", lesson.id);

        Ok(StoredArtifact {
            artifact_id,
            kind,
            text,
            lesson_id: lesson.id,
            module_id: module.id,
            course_id: course.id,
            course_name: course.name,
            module_name: module.name,
            lesson_name: lesson.name,
            questions,
            flashcards,
        })
    }

    /// Answers one learner question and records the exchange in the chat history.
    ///
    /// An empty reply is not recorded.
    pub async fn chat(&self, question: &TutorQuestion) -> Result<ChatEntry, GenerationError> {
        let prompt = self.templates.tutor_prompt(question)?;
        info!(
            "[chat] Tutor question on '{}'.",
            question.topic.as_deref().unwrap_or("no topic")
        );
        debug!("[chat] User prompt: {}", prompt.user);
        let reply = self.ai_provider.generate(&prompt.system, &prompt.user).await?;
        debug!("[chat] Raw response: {reply}");

        if reply.trim().is_empty() {
            warn!("[chat] Provider returned an empty tutor reply.");
            return Err(GenerationError::EmptyReply);
        }

        let entry = self.store.store_chat(question.question.trim(), &reply).await?;
        info!("[chat] Stored tutor exchange {}.", entry.id);
        Ok(entry)
    }
}
