//! # Content Pipeline Tests
//!
//! Exercises `CoursePipeline` against a real in-memory `SqliteProvider` and a
//! scripted `MockAiProvider`, checking both what is returned and what ends up
//! in the database.

mod common;

use crate::common::{
    count_rows, new_store, seed_course, setup_tracing, FailingWrites, MockAiProvider,
    REFERENCE_OUTLINE,
};
use edumate::{
    providers::db::sqlite::SqliteProvider, ArtifactKind, ArtifactPolicy, CoursePipeline,
    EdumateError, GenerationError, LessonLookup, LookupLevel, TutorQuestion,
};

fn by_names(course: &str, module: &str, lesson: &str) -> LessonLookup {
    LessonLookup::ByNames {
        course_name: course.to_string(),
        module_name: module.to_string(),
        lesson_name: lesson.to_string(),
    }
}

fn pipeline(
    ai: &MockAiProvider,
    store: &SqliteProvider,
    policy: ArtifactPolicy,
) -> CoursePipeline {
    CoursePipeline::builder()
        .ai_provider(Box::new(ai.clone()))
        .store(Box::new(store.clone()))
        .artifact_policy(policy)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_generate_outline_persists_course_tree() {
    setup_tracing();
    let store = new_store().await;
    let ai = MockAiProvider::new(vec![REFERENCE_OUTLINE.to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let result = pipeline.generate_outline("X", 2).await.unwrap();
    assert_eq!(result.course_name, "Intro to X");
    assert_eq!(result.outline_text, REFERENCE_OUTLINE);
    assert_eq!(result.parsed_modules.len(), 2);

    // The topic and module count reach the provider.
    let history = ai.call_history.read().unwrap().clone();
    assert_eq!(history.len(), 1);
    assert!(history[0].1.contains("X"));
    assert!(history[0].1.contains('2'));

    let tree = store.get_course_tree(&result.course_id).await.unwrap().unwrap();
    assert_eq!(tree.course.name, "Intro to X");
    assert_eq!(tree.course.topic.as_deref(), Some("X"));
    assert_eq!(tree.course.outcomes, "Auto-generated");
    let module_names: Vec<_> = tree.modules.iter().map(|m| m.module.name.as_str()).collect();
    assert_eq!(module_names, vec!["Basics", "Advanced"]);
    let lesson_names: Vec<_> = tree.modules[0]
        .lessons
        .iter()
        .map(|l| l.name.as_str())
        .collect();
    assert_eq!(lesson_names, vec!["What is X", "History of X"]);
    assert_eq!(tree.modules[1].lessons.len(), 1);
}

#[tokio::test]
async fn test_generate_outline_twice_creates_two_courses() {
    let store = new_store().await;
    let ai = MockAiProvider::new(vec![
        REFERENCE_OUTLINE.to_string(),
        REFERENCE_OUTLINE.to_string(),
    ]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let first = pipeline.generate_outline("X", 2).await.unwrap();
    let second = pipeline.generate_outline("X", 2).await.unwrap();
    assert_ne!(first.course_id, second.course_id);
    assert_eq!(store.list_courses().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_outline_persists_nothing() {
    let store = new_store().await;
    let ai = MockAiProvider::new(vec!["   \n".to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let err = pipeline.generate_outline("X", 3).await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyOutline));
    assert!(store.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_quiz_by_names_creates_exactly_one_row() {
    setup_tracing();
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let quiz_text = "Question 1: What is X?\nA. A letter\nB. A number\nAnswer: A";
    let ai = MockAiProvider::new(vec![quiz_text.to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let stored = pipeline
        .generate_and_store(ArtifactKind::Quiz, &by_names("Intro to X", "Basics", "What is X"))
        .await
        .unwrap();

    assert_eq!(stored.text, quiz_text);
    assert_eq!(stored.kind, ArtifactKind::Quiz);
    assert_eq!(stored.lesson_name, "What is X");
    assert_eq!(stored.questions.as_ref().map(Vec::len), Some(1));
    assert!(stored.flashcards.is_none());

    let quizzes = store.list_quizzes(&stored.lesson_id).await.unwrap();
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].id, stored.artifact_id);
    assert_eq!(quizzes[0].raw_text, quiz_text);
    assert_eq!(Some(quizzes[0].questions.clone()), stored.questions);
    assert_eq!(store.count_quizzes().await.unwrap(), 1);
}

#[tokio::test]
async fn test_prompt_uses_display_names() {
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let ai = MockAiProvider::new(vec!["Some content".to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    pipeline
        .generate_and_store(
            ArtifactKind::Content,
            &by_names("  intro TO x ", "BASICS", "what   is x"),
        )
        .await
        .unwrap();

    let history = ai.call_history.read().unwrap().clone();
    let (_, user_prompt) = &history[0];
    assert!(user_prompt.contains("Intro to X"));
    assert!(user_prompt.contains("Basics"));
    assert!(user_prompt.contains("What is X"));
    assert!(!user_prompt.contains("what   is x"));
}

#[tokio::test]
async fn test_course_miss_does_not_call_provider() {
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let ai = MockAiProvider::new(vec!["unused".to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let err = pipeline
        .generate_and_store(ArtifactKind::Quiz, &by_names("Nope", "Basics", "What is X"))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::NotFound(LookupLevel::Course)));
    assert_eq!(ai.call_count(), 0);
}

#[tokio::test]
async fn test_module_and_lesson_misses_name_their_level() {
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let ai = MockAiProvider::new(vec![]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let module_miss = pipeline
        .generate_and_store(
            ArtifactKind::Flashcards,
            &by_names("Intro to X", "Missing", "What is X"),
        )
        .await
        .unwrap_err();
    assert!(matches!(module_miss, GenerationError::NotFound(LookupLevel::Module)));

    // "Deep Dive" exists, but in the other module.
    let lesson_miss = pipeline
        .generate_and_store(
            ArtifactKind::Flashcards,
            &by_names("Intro to X", "Basics", "Deep Dive"),
        )
        .await
        .unwrap_err();
    assert!(matches!(lesson_miss, GenerationError::NotFound(LookupLevel::Lesson)));
    assert_eq!(ai.call_count(), 0);
}

#[tokio::test]
async fn test_empty_generation_persists_no_row() {
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let ai = MockAiProvider::new(vec!["".to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let err = pipeline
        .generate_and_store(ArtifactKind::Quiz, &by_names("Intro to X", "Basics", "What is X"))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::EmptyGeneration(ArtifactKind::Quiz)));
    assert_eq!(ai.call_count(), 1);
    assert_eq!(store.count_quizzes().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_a_service_error() {
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let ai = MockAiProvider::failing("quota exceeded");
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let err = pipeline
        .generate_and_store(
            ArtifactKind::Content,
            &by_names("Intro to X", "Basics", "What is X"),
        )
        .await
        .unwrap_err();

    match err {
        GenerationError::Service(inner) => {
            assert!(inner.is_upstream());
            assert!(matches!(inner, EdumateError::AiApi(ref m) if m == "quota exceeded"));
        }
        other => panic!("expected a service error, got {other:?}"),
    }
    assert!(store.list_lesson_contents().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_flashcards_by_content_id_resolve_through_content() {
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let ai = MockAiProvider::new(vec![
        "X is a placeholder.".to_string(),
        "Question: What is X?\nAnswer: A placeholder.".to_string(),
    ]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let content = pipeline
        .generate_and_store(
            ArtifactKind::Content,
            &by_names("Intro to X", "Advanced", "Deep Dive"),
        )
        .await
        .unwrap();

    let cards = pipeline
        .generate_and_store(
            ArtifactKind::Flashcards,
            &LessonLookup::ByContentId(content.artifact_id.clone()),
        )
        .await
        .unwrap();

    assert_eq!(cards.lesson_id, content.lesson_id);
    assert_eq!(cards.course_id, content.course_id);
    assert_eq!(cards.module_name, "Advanced");
    let flashcards = cards.flashcards.unwrap();
    assert_eq!(flashcards.len(), 1);
    assert_eq!(flashcards[0].front, "What is X?");

    let sets = store.list_flashcard_sets(&content.lesson_id).await.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].cards, flashcards);
}

#[tokio::test]
async fn test_unknown_content_and_lesson_ids() {
    let store = new_store().await;
    let ai = MockAiProvider::new(vec![]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let content_miss = pipeline
        .generate_and_store(ArtifactKind::Quiz, &LessonLookup::ByContentId("missing".into()))
        .await
        .unwrap_err();
    assert!(matches!(content_miss, GenerationError::NotFound(LookupLevel::Content)));

    let lesson_miss = pipeline
        .generate_and_store(ArtifactKind::Quiz, &LessonLookup::ByLessonId("missing".into()))
        .await
        .unwrap_err();
    assert!(matches!(lesson_miss, GenerationError::NotFound(LookupLevel::Lesson)));
    assert_eq!(ai.call_count(), 0);
}

#[tokio::test]
async fn test_append_keeps_history_and_overwrite_replaces_it() {
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let lesson_id = store.list_all_lessons().await.unwrap()[0].lesson_id.clone();
    let lookup = LessonLookup::ByLessonId(lesson_id.clone());

    let ai = MockAiProvider::new(vec!["first".into(), "second".into(), "third".into()]);
    let append = pipeline(&ai, &store, ArtifactPolicy::Append);
    append.generate_and_store(ArtifactKind::Content, &lookup).await.unwrap();
    append.generate_and_store(ArtifactKind::Content, &lookup).await.unwrap();
    assert_eq!(store.list_lesson_contents().await.unwrap().len(), 2);

    let overwrite = pipeline(&ai, &store, ArtifactPolicy::Overwrite);
    let stored = overwrite
        .generate_and_store(ArtifactKind::Content, &lookup)
        .await
        .unwrap();

    let contents = store.list_lesson_contents().await.unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].content_id, stored.artifact_id);
    assert_eq!(contents[0].content, "third");
    let latest = store.latest_lesson_content(&lesson_id).await.unwrap().unwrap();
    assert_eq!(latest.content, "third");
}

#[tokio::test]
async fn test_builder_requires_provider_and_store() {
    let store = new_store().await;
    let missing_provider = CoursePipeline::builder()
        .store(Box::new(store.clone()))
        .build()
        .unwrap_err();
    assert!(matches!(missing_provider, EdumateError::MissingAiProvider(_)));

    let missing_store = CoursePipeline::builder()
        .ai_provider(Box::new(MockAiProvider::new(vec![])))
        .build()
        .unwrap_err();
    assert!(matches!(missing_store, EdumateError::MissingStore));
}

#[tokio::test]
async fn test_failed_tree_insert_leaves_no_partial_course() {
    setup_tracing();
    let store = new_store().await;
    // The course and module inserts succeed, then the first lesson insert fails.
    let conn = store.db.connect().unwrap();
    conn.execute("DROP TABLE lessons", ()).await.unwrap();

    let ai = MockAiProvider::new(vec![REFERENCE_OUTLINE.to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);
    let err = pipeline.generate_outline("X", 2).await.unwrap_err();

    match err {
        GenerationError::Service(inner) => assert!(!inner.is_upstream()),
        other => panic!("expected a service error, got {other:?}"),
    }
    assert_eq!(count_rows(&store, "courses").await, 0);
    assert_eq!(count_rows(&store, "modules").await, 0);
}

#[tokio::test]
async fn test_failed_artifact_write_is_a_service_error() {
    let store = new_store().await;
    seed_course(&store, REFERENCE_OUTLINE).await;
    let ai = MockAiProvider::new(vec!["Question 1: Q?\nA. a\nAnswer: A".to_string()]);
    let pipeline = CoursePipeline::builder()
        .ai_provider(Box::new(ai.clone()))
        .store(Box::new(FailingWrites {
            inner: store.clone(),
        }))
        .artifact_policy(ArtifactPolicy::Overwrite)
        .build()
        .unwrap();

    let err = pipeline
        .generate_and_store(ArtifactKind::Quiz, &by_names("Intro to X", "Basics", "What is X"))
        .await
        .unwrap_err();

    match err {
        GenerationError::Service(inner) => {
            assert!(!inner.is_upstream());
            assert!(matches!(inner, EdumateError::StorageOperationFailed(_)));
        }
        other => panic!("expected a service error, got {other:?}"),
    }
    assert_eq!(ai.call_count(), 1);
    assert_eq!(count_rows(&store, "quizzes").await, 0);
}

fn question(text: &str) -> TutorQuestion {
    TutorQuestion {
        question: text.to_string(),
        confidence: Some("medium".to_string()),
        topic: Some("Rust".to_string()),
    }
}

#[tokio::test]
async fn test_chat_answers_and_records_the_exchange() {
    let store = new_store().await;
    let ai = MockAiProvider::new(vec!["Borrows end at their last use.".to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let entry = pipeline
        .chat(&question("  When does a borrow end? "))
        .await
        .unwrap();

    assert_eq!(entry.message, "When does a borrow end?");
    assert_eq!(entry.response, "Borrows end at their last use.");
    let history = ai.call_history.read().unwrap().clone();
    assert_eq!(history.len(), 1);
    assert!(history[0].1.contains("When does a borrow end?"));
    assert!(history[0].1.contains("'medium'"));

    let stored = store.list_chat_history(10).await.unwrap();
    assert_eq!(stored, vec![entry]);
}

#[tokio::test]
async fn test_empty_tutor_reply_is_not_recorded() {
    let store = new_store().await;
    let ai = MockAiProvider::new(vec![" \n\t".to_string()]);
    let pipeline = pipeline(&ai, &store, ArtifactPolicy::Append);

    let err = pipeline.chat(&question("Why?")).await.unwrap_err();

    assert!(matches!(err, GenerationError::EmptyReply));
    assert_eq!(count_rows(&store, "chat_history").await, 0);
}

#[tokio::test]
async fn test_tutor_upstream_and_storage_failures() {
    let store = new_store().await;
    let failing_ai = MockAiProvider::failing("model overloaded");
    let err = pipeline(&failing_ai, &store, ArtifactPolicy::Append)
        .chat(&question("Why?"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Service(ref inner) if inner.is_upstream()));

    let ai = MockAiProvider::new(vec!["Because.".to_string()]);
    let read_only = CoursePipeline::builder()
        .ai_provider(Box::new(ai))
        .store(Box::new(FailingWrites {
            inner: store.clone(),
        }))
        .build()
        .unwrap();
    let err = read_only.chat(&question("Why?")).await.unwrap_err();
    assert!(matches!(err, GenerationError::Service(ref inner) if !inner.is_upstream()));
    assert_eq!(count_rows(&store, "chat_history").await, 0);
}
