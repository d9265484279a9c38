//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL query strings for the SQLite provider.
//! This makes the core logic cleaner and isolates database-specific syntax.
//!
//! Column order in each `SELECT_*` constant is the order the row conversions
//! in the parent module read them in.

pub const CREATE_COURSES_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL,
    topic TEXT,
    overview TEXT NOT NULL,
    outcomes TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

pub const CREATE_MODULES_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS modules (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL REFERENCES courses(id),
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL
);
"#;

pub const CREATE_LESSONS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS lessons (
    id TEXT PRIMARY KEY,
    module_id TEXT NOT NULL REFERENCES modules(id),
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL
);
"#;

pub const CREATE_LESSON_CONTENTS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS lesson_contents (
    id TEXT PRIMARY KEY,
    lesson_id TEXT NOT NULL REFERENCES lessons(id),
    course_id TEXT NOT NULL REFERENCES courses(id),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

pub const CREATE_QUIZZES_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS quizzes (
    id TEXT PRIMARY KEY,
    lesson_id TEXT NOT NULL REFERENCES lessons(id),
    raw_text TEXT NOT NULL,
    questions TEXT NOT NULL,
    points INTEGER,
    created_at TEXT NOT NULL
);
"#;

pub const CREATE_FLASHCARD_SETS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS flashcard_sets (
    id TEXT PRIMARY KEY,
    lesson_id TEXT NOT NULL REFERENCES lessons(id),
    raw_text TEXT NOT NULL,
    cards TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

pub const CREATE_LESSON_PROGRESS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS lesson_progress (
    user_email TEXT NOT NULL,
    course_id TEXT NOT NULL,
    module_id TEXT NOT NULL,
    lesson_id TEXT NOT NULL,
    progress REAL NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_email, course_id, module_id, lesson_id)
);
"#;

pub const CREATE_CHAT_HISTORY_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS chat_history (
    id TEXT PRIMARY KEY,
    message TEXT NOT NULL,
    response TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

pub const CREATE_INDEXES_SQL: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_courses_name_key ON courses (name_key);",
    "CREATE INDEX IF NOT EXISTS idx_modules_course ON modules (course_id, name_key);",
    "CREATE INDEX IF NOT EXISTS idx_lessons_module ON lessons (module_id, name_key);",
    "CREATE INDEX IF NOT EXISTS idx_lesson_contents_lesson ON lesson_contents (lesson_id);",
    "CREATE INDEX IF NOT EXISTS idx_quizzes_lesson ON quizzes (lesson_id);",
    "CREATE INDEX IF NOT EXISTS idx_flashcard_sets_lesson ON flashcard_sets (lesson_id);",
];

/// All table creation statements, in dependency order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_COURSES_TABLE_SQL,
    CREATE_MODULES_TABLE_SQL,
    CREATE_LESSONS_TABLE_SQL,
    CREATE_LESSON_CONTENTS_TABLE_SQL,
    CREATE_QUIZZES_TABLE_SQL,
    CREATE_FLASHCARD_SETS_TABLE_SQL,
    CREATE_LESSON_PROGRESS_TABLE_SQL,
    CREATE_CHAT_HISTORY_TABLE_SQL,
];

// --- Transactions ---

pub const BEGIN: &str = "BEGIN TRANSACTION";
pub const COMMIT: &str = "COMMIT";
pub const ROLLBACK: &str = "ROLLBACK";

// --- Inserts ---

pub const INSERT_COURSE: &str = "INSERT INTO courses (id, name, name_key, topic, overview, outcomes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)";
pub const INSERT_MODULE: &str =
    "INSERT INTO modules (id, course_id, position, name, name_key) VALUES (?, ?, ?, ?, ?)";
pub const INSERT_LESSON: &str =
    "INSERT INTO lessons (id, module_id, position, name, name_key) VALUES (?, ?, ?, ?, ?)";
pub const INSERT_LESSON_CONTENT: &str = "INSERT INTO lesson_contents (id, lesson_id, course_id, content, created_at) VALUES (?, ?, ?, ?, ?)";
pub const INSERT_QUIZ: &str = "INSERT INTO quizzes (id, lesson_id, raw_text, questions, points, created_at) VALUES (?, ?, ?, ?, NULL, ?)";
pub const INSERT_FLASHCARD_SET: &str = "INSERT INTO flashcard_sets (id, lesson_id, raw_text, cards, created_at) VALUES (?, ?, ?, ?, ?)";

pub const INSERT_CHAT_ENTRY: &str =
    "INSERT INTO chat_history (id, message, response, created_at) VALUES (?, ?, ?, ?)";

pub const UPSERT_PROGRESS: &str = "INSERT INTO lesson_progress (user_email, course_id, module_id, lesson_id, progress, updated_at)
     VALUES (?, ?, ?, ?, ?, ?)
     ON CONFLICT(user_email, course_id, module_id, lesson_id) DO UPDATE SET
     progress = excluded.progress,
     updated_at = excluded.updated_at";

// --- Overwrite policy ---

pub const DELETE_LESSON_CONTENTS_FOR_LESSON: &str =
    "DELETE FROM lesson_contents WHERE lesson_id = ?";
pub const DELETE_QUIZZES_FOR_LESSON: &str = "DELETE FROM quizzes WHERE lesson_id = ?";
pub const DELETE_FLASHCARD_SETS_FOR_LESSON: &str =
    "DELETE FROM flashcard_sets WHERE lesson_id = ?";

// --- Selects ---

pub const SELECT_COURSE: &str =
    "SELECT id, name, topic, overview, outcomes, created_at FROM courses";
pub const SELECT_MODULE: &str = "SELECT id, course_id, position, name FROM modules";
pub const SELECT_LESSON: &str = "SELECT id, module_id, position, name FROM lessons";
pub const SELECT_LESSON_CONTENT: &str =
    "SELECT id, lesson_id, course_id, content, created_at FROM lesson_contents";
pub const SELECT_QUIZ: &str =
    "SELECT id, lesson_id, raw_text, questions, points, created_at FROM quizzes";
pub const SELECT_FLASHCARD_SET: &str =
    "SELECT id, lesson_id, raw_text, cards, created_at FROM flashcard_sets";

pub const SELECT_ALL_LESSONS_WITH_LINEAGE: &str = "
    SELECT l.id, l.name, m.id, m.name, c.id, c.name
    FROM lessons l
    JOIN modules m ON l.module_id = m.id
    JOIN courses c ON m.course_id = c.id
    ORDER BY c.created_at DESC, c.rowid DESC, m.position ASC, l.position ASC";

pub const SELECT_LESSON_CONTENTS_WITH_LINEAGE: &str = "
    SELECT lc.id, lc.lesson_id, lc.course_id, lc.content, l.name, m.name, c.name
    FROM lesson_contents lc
    JOIN lessons l ON lc.lesson_id = l.id
    JOIN modules m ON l.module_id = m.id
    JOIN courses c ON m.course_id = c.id
    ORDER BY lc.created_at DESC, lc.rowid DESC";

pub const SELECT_PROGRESS: &str = "SELECT module_id, lesson_id, progress, updated_at FROM lesson_progress WHERE user_email = ? AND course_id = ? ORDER BY updated_at ASC, rowid ASC";

pub const SELECT_CHAT_HISTORY: &str = "SELECT id, message, response, created_at FROM chat_history ORDER BY created_at DESC, rowid DESC LIMIT ?";

pub const COUNT_QUIZZES: &str = "SELECT COUNT(*) FROM quizzes";
pub const UPDATE_QUIZ_POINTS: &str = "UPDATE quizzes SET points = ? WHERE id = ?";
