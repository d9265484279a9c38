use crate::{
    artifacts::{decode_flashcards, decode_questions, encode_flashcards, encode_questions},
    errors::EdumateError,
    providers::db::storage::{CourseStore, ProgressStore},
    types::{
        name_key, ArtifactKind, ArtifactPolicy, ChatEntry, Course, CourseTree, FlashcardSet, Lesson,
        LessonContent, LessonContentListing, LessonListing, LessonProgress, Module, ModuleTree,
        NewArtifact, NewCourse, ParsedOutline, ProgressUpdate, Quiz,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use std::fmt::{self, Debug};
use tracing::{debug, info, warn};
use turso::{params, Connection, Database, Row, Value as TursoValue};
use uuid::Uuid;

mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// This provider holds a `Database` instance, which manages a connection pool.
/// When cloned, it shares the same underlying database, allowing for concurrent and
/// shared access to the same database file or in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a unique,
    ///   isolated in-memory database. To share an in-memory database across multiple
    ///   `SqliteProvider` instances (e.g., in tests), create one provider and
    ///   then `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, EdumateError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| EdumateError::StorageConnection(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| EdumateError::StorageConnection(e.to_string()))?;
        // PRAGMA returns a row, so it must go through `query`.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| EdumateError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Ensures that all course tables and indexes exist.
    /// This function is idempotent and safe to call on every application startup.
    pub async fn initialize_schema(&self) -> Result<(), EdumateError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| EdumateError::StorageConnection(e.to_string()))?;

        for statement in sql::ALL_TABLE_CREATION_SQL
            .iter()
            .chain(sql::CREATE_INDEXES_SQL.iter())
        {
            conn.execute(statement, ())
                .await
                .map_err(|e| EdumateError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// All courses, newest first.
    pub async fn list_courses(&self) -> Result<Vec<Course>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!("{} ORDER BY created_at DESC, rowid DESC", sql::SELECT_COURSE),
                (),
            )
            .await?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next().await? {
            courses.push(Course::try_from(&row)?);
        }
        Ok(courses)
    }

    /// A course with its modules and lessons in outline order.
    pub async fn get_course_tree(&self, course_id: &str) -> Result<Option<CourseTree>, EdumateError> {
        let Some(course) = self.get_course(course_id).await? else {
            return Ok(None);
        };
        let mut modules = Vec::new();
        for module in self.list_modules(course_id).await? {
            let lessons = self.list_lessons(&module.id).await?;
            modules.push(ModuleTree { module, lessons });
        }
        Ok(Some(CourseTree { course, modules }))
    }

    pub async fn list_modules(&self, course_id: &str) -> Result<Vec<Module>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "{} WHERE course_id = ? ORDER BY position ASC",
                    sql::SELECT_MODULE
                ),
                params![course_id],
            )
            .await?;
        let mut modules = Vec::new();
        while let Some(row) = rows.next().await? {
            modules.push(Module::try_from(&row)?);
        }
        Ok(modules)
    }

    pub async fn list_lessons(&self, module_id: &str) -> Result<Vec<Lesson>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "{} WHERE module_id = ? ORDER BY position ASC",
                    sql::SELECT_LESSON
                ),
                params![module_id],
            )
            .await?;
        let mut lessons = Vec::new();
        while let Some(row) = rows.next().await? {
            lessons.push(Lesson::try_from(&row)?);
        }
        Ok(lessons)
    }

    /// Every lesson of every course, with the names of its module and course.
    pub async fn list_all_lessons(&self) -> Result<Vec<LessonListing>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query(sql::SELECT_ALL_LESSONS_WITH_LINEAGE, ()).await?;
        let mut listings = Vec::new();
        while let Some(row) = rows.next().await? {
            listings.push(LessonListing {
                lesson_id: text(&row, 0)?,
                lesson_name: text(&row, 1)?,
                module_id: text(&row, 2)?,
                module_name: text(&row, 3)?,
                course_id: text(&row, 4)?,
                course_name: text(&row, 5)?,
            });
        }
        Ok(listings)
    }

    /// The most recently stored content of a lesson.
    pub async fn latest_lesson_content(
        &self,
        lesson_id: &str,
    ) -> Result<Option<LessonContent>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "{} WHERE lesson_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
                    sql::SELECT_LESSON_CONTENT
                ),
                params![lesson_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(LessonContent::try_from(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_lesson_contents(&self) -> Result<Vec<LessonContentListing>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(sql::SELECT_LESSON_CONTENTS_WITH_LINEAGE, ())
            .await?;
        let mut listings = Vec::new();
        while let Some(row) = rows.next().await? {
            listings.push(LessonContentListing {
                content_id: text(&row, 0)?,
                lesson_id: text(&row, 1)?,
                course_id: text(&row, 2)?,
                content: text(&row, 3)?,
                lesson_name: text(&row, 4)?,
                module_name: text(&row, 5)?,
                course_name: text(&row, 6)?,
            });
        }
        Ok(listings)
    }

    /// Quizzes of a lesson, oldest first.
    pub async fn list_quizzes(&self, lesson_id: &str) -> Result<Vec<Quiz>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "{} WHERE lesson_id = ? ORDER BY created_at ASC, rowid ASC",
                    sql::SELECT_QUIZ
                ),
                params![lesson_id],
            )
            .await?;
        let mut quizzes = Vec::new();
        while let Some(row) = rows.next().await? {
            quizzes.push(Quiz::try_from(&row)?);
        }
        Ok(quizzes)
    }

    /// Flashcard sets of a lesson, oldest first.
    pub async fn list_flashcard_sets(
        &self,
        lesson_id: &str,
    ) -> Result<Vec<FlashcardSet>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "{} WHERE lesson_id = ? ORDER BY created_at ASC, rowid ASC",
                    sql::SELECT_FLASHCARD_SET
                ),
                params![lesson_id],
            )
            .await?;
        let mut sets = Vec::new();
        while let Some(row) = rows.next().await? {
            sets.push(FlashcardSet::try_from(&row)?);
        }
        Ok(sets)
    }

    /// The most recent tutor exchanges, newest first.
    pub async fn list_chat_history(&self, limit: u32) -> Result<Vec<ChatEntry>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(sql::SELECT_CHAT_HISTORY, params![limit as i64])
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(ChatEntry::try_from(&row)?);
        }
        Ok(entries)
    }

    pub async fn count_quizzes(&self) -> Result<i64, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query(sql::COUNT_QUIZZES, ()).await?;
        match rows.next().await? {
            Some(row) => integer(&row, 0),
            None => Ok(0),
        }
    }

    /// Records the score of a submitted quiz. Returns `false` when no quiz has that id.
    pub async fn set_quiz_points(&self, quiz_id: &str, points: i64) -> Result<bool, EdumateError> {
        let conn = self.db.connect()?;
        let affected = conn
            .execute(sql::UPDATE_QUIZ_POINTS, params![points, quiz_id])
            .await?;
        Ok(affected > 0)
    }

    async fn fetch_one<T>(&self, select: &str, id: &str) -> Result<Option<T>, EdumateError>
    where
        T: for<'r> TryFrom<&'r Row, Error = EdumateError>,
    {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(&format!("{select} WHERE id = ?"), params![id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(T::try_from(&row)?)),
            None => Ok(None),
        }
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

impl AsRef<Database> for SqliteProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl CourseStore for SqliteProvider {
    async fn insert_course_tree(
        &self,
        course: &NewCourse,
        outline: &ParsedOutline,
    ) -> Result<Course, EdumateError> {
        let conn = self.db.connect()?;
        conn.execute(sql::BEGIN, ()).await?;
        let stored = match write_course_tree(&conn, course, outline).await {
            Ok(stored) => stored,
            Err(e) => return Err(rollback(&conn, e).await),
        };
        conn.execute(sql::COMMIT, ()).await?;
        info!(
            "Stored course '{}' with {} modules.",
            course.name,
            outline.modules.len()
        );
        Ok(stored)
    }

    async fn find_course_by_key(&self, key: &str) -> Result<Option<Course>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "{} WHERE name_key = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
                    sql::SELECT_COURSE
                ),
                params![key],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Course::try_from(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_module_by_key(
        &self,
        course_id: &str,
        key: &str,
    ) -> Result<Option<Module>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "{} WHERE course_id = ? AND name_key = ? ORDER BY position ASC LIMIT 1",
                    sql::SELECT_MODULE
                ),
                params![course_id, key],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Module::try_from(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_lesson_by_key(
        &self,
        module_id: &str,
        key: &str,
    ) -> Result<Option<Lesson>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "{} WHERE module_id = ? AND name_key = ? ORDER BY position ASC LIMIT 1",
                    sql::SELECT_LESSON
                ),
                params![module_id, key],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Lesson::try_from(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_course(&self, course_id: &str) -> Result<Option<Course>, EdumateError> {
        self.fetch_one(sql::SELECT_COURSE, course_id).await
    }

    async fn get_module(&self, module_id: &str) -> Result<Option<Module>, EdumateError> {
        self.fetch_one(sql::SELECT_MODULE, module_id).await
    }

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<Lesson>, EdumateError> {
        self.fetch_one(sql::SELECT_LESSON, lesson_id).await
    }

    async fn get_lesson_content(
        &self,
        content_id: &str,
    ) -> Result<Option<LessonContent>, EdumateError> {
        self.fetch_one(sql::SELECT_LESSON_CONTENT, content_id).await
    }

    async fn store_artifact(
        &self,
        artifact: &NewArtifact,
        policy: ArtifactPolicy,
    ) -> Result<String, EdumateError> {
        // Encode before opening the transaction so a failure leaves nothing half-written.
        let encoded = match artifact {
            NewArtifact::Content { .. } => String::new(),
            NewArtifact::Quiz { questions, .. } => encode_questions(questions)?,
            NewArtifact::Flashcards { cards, .. } => encode_flashcards(cards)?,
        };

        let conn = self.db.connect()?;
        conn.execute(sql::BEGIN, ()).await?;
        let artifact_id = match write_artifact(&conn, artifact, policy, encoded).await {
            Ok(id) => id,
            Err(e) => return Err(rollback(&conn, e).await),
        };
        conn.execute(sql::COMMIT, ()).await?;
        Ok(artifact_id)
    }

    async fn store_chat(&self, message: &str, response: &str) -> Result<ChatEntry, EdumateError> {
        let entry = ChatEntry {
            id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            response: response.to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        };
        let conn = self.db.connect()?;
        conn.execute(
            sql::INSERT_CHAT_ENTRY,
            params![
                entry.id.clone(),
                entry.message.clone(),
                entry.response.clone(),
                format_timestamp(&entry.created_at)
            ],
        )
        .await?;
        debug!("Stored tutor exchange {}.", entry.id);
        Ok(entry)
    }
}

// --- Transaction bodies ---

/// Undoes the open transaction and hands back the error that caused it.
async fn rollback(conn: &Connection, cause: EdumateError) -> EdumateError {
    if let Err(e) = conn.execute(sql::ROLLBACK, ()).await {
        warn!("Rollback after '{cause}' failed: {e}");
    }
    cause
}

async fn write_course_tree(
    conn: &Connection,
    course: &NewCourse,
    outline: &ParsedOutline,
) -> Result<Course, EdumateError> {
    let course_id = Uuid::new_v4().to_string();
    let created_at = Utc::now().trunc_subsecs(6);
    conn.execute(
        sql::INSERT_COURSE,
        params![
            course_id.clone(),
            course.name.clone(),
            name_key(&course.name),
            course.topic.clone(),
            course.overview.clone(),
            course.outcomes.clone(),
            format_timestamp(&created_at)
        ],
    )
    .await?;

    for (module_position, module) in outline.modules.iter().enumerate() {
        let module_id = Uuid::new_v4().to_string();
        conn.execute(
            sql::INSERT_MODULE,
            params![
                module_id.clone(),
                course_id.clone(),
                module_position as i64,
                module.module_name.clone(),
                name_key(&module.module_name)
            ],
        )
        .await?;

        for (lesson_position, lesson) in module.lessons.iter().enumerate() {
            conn.execute(
                sql::INSERT_LESSON,
                params![
                    Uuid::new_v4().to_string(),
                    module_id.clone(),
                    lesson_position as i64,
                    lesson.clone(),
                    name_key(lesson)
                ],
            )
            .await?;
        }
    }

    Ok(Course {
        id: course_id,
        name: course.name.clone(),
        topic: course.topic.clone(),
        overview: course.overview.clone(),
        outcomes: course.outcomes.clone(),
        created_at,
    })
}

/// `encoded` is the JSON column value for quizzes and flashcards; content ignores it.
async fn write_artifact(
    conn: &Connection,
    artifact: &NewArtifact,
    policy: ArtifactPolicy,
    encoded: String,
) -> Result<String, EdumateError> {
    if policy == ArtifactPolicy::Overwrite {
        let delete = match artifact.kind() {
            ArtifactKind::Content => sql::DELETE_LESSON_CONTENTS_FOR_LESSON,
            ArtifactKind::Quiz => sql::DELETE_QUIZZES_FOR_LESSON,
            ArtifactKind::Flashcards => sql::DELETE_FLASHCARD_SETS_FOR_LESSON,
        };
        let removed = conn.execute(delete, params![artifact.lesson_id()]).await?;
        debug!(
            "Overwrite policy removed {removed} previous {} rows for lesson {}.",
            artifact.kind(),
            artifact.lesson_id()
        );
    }

    let artifact_id = Uuid::new_v4().to_string();
    let created_at = format_timestamp(&Utc::now());
    match artifact {
        NewArtifact::Content {
            lesson_id,
            course_id,
            content,
        } => {
            conn.execute(
                sql::INSERT_LESSON_CONTENT,
                params![
                    artifact_id.clone(),
                    lesson_id.clone(),
                    course_id.clone(),
                    content.clone(),
                    created_at
                ],
            )
            .await?;
        }
        NewArtifact::Quiz {
            lesson_id,
            raw_text,
            ..
        } => {
            conn.execute(
                sql::INSERT_QUIZ,
                params![
                    artifact_id.clone(),
                    lesson_id.clone(),
                    raw_text.clone(),
                    encoded,
                    created_at
                ],
            )
            .await?;
        }
        NewArtifact::Flashcards {
            lesson_id,
            raw_text,
            ..
        } => {
            conn.execute(
                sql::INSERT_FLASHCARD_SET,
                params![
                    artifact_id.clone(),
                    lesson_id.clone(),
                    raw_text.clone(),
                    encoded,
                    created_at
                ],
            )
            .await?;
        }
    }
    Ok(artifact_id)
}

#[async_trait]
impl ProgressStore for SqliteProvider {
    async fn upsert_progress(&self, update: &ProgressUpdate) -> Result<(), EdumateError> {
        let conn = self.db.connect()?;
        conn.execute(
            sql::UPSERT_PROGRESS,
            params![
                update.user_email.clone(),
                update.course_id.clone(),
                update.module_id.clone(),
                update.lesson_id.clone(),
                update.progress,
                format_timestamp(&Utc::now())
            ],
        )
        .await?;
        Ok(())
    }

    async fn get_progress(
        &self,
        user_email: &str,
        course_id: &str,
    ) -> Result<Vec<LessonProgress>, EdumateError> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(sql::SELECT_PROGRESS, params![user_email, course_id])
            .await?;
        let mut progress = Vec::new();
        while let Some(row) = rows.next().await? {
            progress.push(LessonProgress {
                module_id: text(&row, 0)?,
                lesson_id: text(&row, 1)?,
                progress: real(&row, 2)?,
                updated_at: timestamp(&row, 3)?,
            });
        }
        Ok(progress)
    }
}

// --- Row conversions ---

impl TryFrom<&Row> for Course {
    type Error = EdumateError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Course {
            id: text(row, 0)?,
            name: text(row, 1)?,
            topic: opt_text(row, 2)?,
            overview: text(row, 3)?,
            outcomes: text(row, 4)?,
            created_at: timestamp(row, 5)?,
        })
    }
}

impl TryFrom<&Row> for Module {
    type Error = EdumateError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Module {
            id: text(row, 0)?,
            course_id: text(row, 1)?,
            position: integer(row, 2)?,
            name: text(row, 3)?,
        })
    }
}

impl TryFrom<&Row> for Lesson {
    type Error = EdumateError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Lesson {
            id: text(row, 0)?,
            module_id: text(row, 1)?,
            position: integer(row, 2)?,
            name: text(row, 3)?,
        })
    }
}

impl TryFrom<&Row> for LessonContent {
    type Error = EdumateError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(LessonContent {
            id: text(row, 0)?,
            lesson_id: text(row, 1)?,
            course_id: text(row, 2)?,
            content: text(row, 3)?,
            created_at: timestamp(row, 4)?,
        })
    }
}

impl TryFrom<&Row> for Quiz {
    type Error = EdumateError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Quiz {
            id: text(row, 0)?,
            lesson_id: text(row, 1)?,
            raw_text: text(row, 2)?,
            questions: decode_questions(&text(row, 3)?)?,
            points: opt_integer(row, 4)?,
            created_at: timestamp(row, 5)?,
        })
    }
}

impl TryFrom<&Row> for FlashcardSet {
    type Error = EdumateError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(FlashcardSet {
            id: text(row, 0)?,
            lesson_id: text(row, 1)?,
            raw_text: text(row, 2)?,
            cards: decode_flashcards(&text(row, 3)?)?,
            created_at: timestamp(row, 4)?,
        })
    }
}

impl TryFrom<&Row> for ChatEntry {
    type Error = EdumateError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(ChatEntry {
            id: text(row, 0)?,
            message: text(row, 1)?,
            response: text(row, 2)?,
            created_at: timestamp(row, 3)?,
        })
    }
}

fn unexpected(idx: usize, expected: &str, found: &TursoValue) -> EdumateError {
    EdumateError::StorageOperationFailed(format!(
        "column {idx}: expected {expected}, found {found:?}"
    ))
}

fn text(row: &Row, idx: usize) -> Result<String, EdumateError> {
    match row.get_value(idx)? {
        TursoValue::Text(s) => Ok(s),
        other => Err(unexpected(idx, "text", &other)),
    }
}

fn opt_text(row: &Row, idx: usize) -> Result<Option<String>, EdumateError> {
    match row.get_value(idx)? {
        TursoValue::Null => Ok(None),
        TursoValue::Text(s) => Ok(Some(s)),
        other => Err(unexpected(idx, "text or null", &other)),
    }
}

fn integer(row: &Row, idx: usize) -> Result<i64, EdumateError> {
    match row.get_value(idx)? {
        TursoValue::Integer(i) => Ok(i),
        other => Err(unexpected(idx, "integer", &other)),
    }
}

fn opt_integer(row: &Row, idx: usize) -> Result<Option<i64>, EdumateError> {
    match row.get_value(idx)? {
        TursoValue::Null => Ok(None),
        TursoValue::Integer(i) => Ok(Some(i)),
        other => Err(unexpected(idx, "integer or null", &other)),
    }
}

fn real(row: &Row, idx: usize) -> Result<f64, EdumateError> {
    match row.get_value(idx)? {
        TursoValue::Real(f) => Ok(f),
        TursoValue::Integer(i) => Ok(i as f64),
        other => Err(unexpected(idx, "real", &other)),
    }
}

/// Timestamps are written as RFC 3339 with a fixed `Z` suffix so that they
/// sort lexically. Plain SQLite `CURRENT_TIMESTAMP` values are accepted too.
fn timestamp(row: &Row, idx: usize) -> Result<DateTime<Utc>, EdumateError> {
    let raw = text(row, idx)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            EdumateError::StorageOperationFailed(format!("column {idx}: bad timestamp '{raw}': {e}"))
        })
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
