//! # Outline Parsing
//!
//! Turns the free-text outline returned by the AI provider into a
//! `ParsedOutline`. The expected shape is the one the outline prompt asks for:
//!
//! ```text
//! Course Title: <title>
//!
//! Module 1: <module name>
//! - Lesson: <lesson name>
//! ```
//!
//! Parsing is line-by-line and best effort. Lines that match none of the
//! patterns are skipped, so malformed input yields a partial tree rather
//! than an error.

use crate::types::{ParsedModule, ParsedOutline};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// The title used when the outline has no usable `Course Title:` line.
pub const DEFAULT_COURSE_TITLE: &str = "Untitled";

const COURSE_TITLE_PREFIX: &str = "course title:";
const LESSON_MARKER: &str = "- Lesson:";

static MODULE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^module\s*\d+\s*:").unwrap());

/// Parses a raw outline into a course title and its ordered modules.
///
/// - A `Module <n>:` header (any casing) closes the open module and opens a new one.
/// - A `- Lesson:` line is added to the open module; with no open module it is dropped.
/// - The last open module is flushed when the input ends.
pub fn parse_outline(raw_outline: &str) -> ParsedOutline {
    let mut course_title: Option<String> = None;
    let mut modules = Vec::new();
    let mut current: Option<ParsedModule> = None;

    for line in raw_outline.lines() {
        let line = line.trim();

        if let Some(rest) = strip_prefix_ignore_case(line, COURSE_TITLE_PREFIX) {
            let title = rest.trim();
            if !title.is_empty() {
                course_title = Some(title.to_string());
            }
        } else if let Some(header) = MODULE_HEADER.find(line) {
            if let Some(done) = current.take() {
                modules.push(done);
            }
            let name = line[header.end()..].trim();
            let module_name = if name.is_empty() { line } else { name };
            current = Some(ParsedModule {
                module_name: module_name.to_string(),
                lessons: Vec::new(),
            });
        } else if let Some(rest) = line.strip_prefix(LESSON_MARKER) {
            let lesson = rest.trim();
            match current.as_mut() {
                Some(module) if !lesson.is_empty() => module.lessons.push(lesson.to_string()),
                Some(_) => {}
                None => debug!(lesson, "Dropping lesson that appears before any module header."),
            }
        }
    }

    if let Some(done) = current {
        modules.push(done);
    }

    ParsedOutline {
        course_title: course_title.unwrap_or_else(|| DEFAULT_COURSE_TITLE.to_string()),
        modules,
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(outline: &ParsedOutline) -> Vec<&str> {
        outline
            .modules
            .iter()
            .map(|m| m.module_name.as_str())
            .collect()
    }

    #[test]
    fn test_parse_reference_outline() {
        let raw = "Course Title: Intro to X\n\nModule 1: Basics\n- Lesson: What is X\n- Lesson: History of X\n\nModule 2: Advanced\n- Lesson: Deep Dive";
        let outline = parse_outline(raw);

        assert_eq!(outline.course_title, "Intro to X");
        assert_eq!(names(&outline), vec!["Basics", "Advanced"]);
        assert_eq!(outline.modules[0].lessons, vec!["What is X", "History of X"]);
        assert_eq!(outline.modules[1].lessons, vec!["Deep Dive"]);
    }

    #[test]
    fn test_missing_title_uses_default() {
        let outline = parse_outline("Module 1: Only\n- Lesson: One");
        assert_eq!(outline.course_title, DEFAULT_COURSE_TITLE);
        assert_eq!(outline.modules.len(), 1);
        assert_eq!(outline.modules[0].lessons, vec!["One"]);
    }

    #[test]
    fn test_lesson_before_any_module_is_dropped() {
        let raw = "Course Title: T\n- Lesson: Orphan\nModule 1: First\n- Lesson: Kept";
        let outline = parse_outline(raw);
        assert_eq!(outline.modules.len(), 1);
        assert_eq!(outline.modules[0].lessons, vec!["Kept"]);
    }

    #[test]
    fn test_final_module_is_flushed() {
        let outline = parse_outline("Module 1: A\n- Lesson: a1\nModule 2: B");
        assert_eq!(names(&outline), vec!["A", "B"]);
        assert!(outline.modules[1].lessons.is_empty());
    }

    #[test]
    fn test_preserves_source_order_not_numbering() {
        let raw = "Module 3: Third\n- Lesson: z\n- Lesson: a\nModule 1: First\n- Lesson: m";
        let outline = parse_outline(raw);
        assert_eq!(names(&outline), vec!["Third", "First"]);
        assert_eq!(outline.modules[0].lessons, vec!["z", "a"]);
    }

    #[test]
    fn test_tolerates_casing_indentation_and_noise() {
        let raw = "Here is your outline!\n\
                   COURSE TITLE:   Rust for Pythonistas  \n\
                   ---\n\
                   \tmodule 1:  Ownership\n\
                   \t- Lesson: Moves\n\
                   Some stray prose about ownership.\n\
                   MODULE 2 : Traits\n\
                   - Lesson: Generics\n\
                   * Lesson: not a marker\n\
                   Module3: Macros\n\
                   Hope this helps.";
        let outline = parse_outline(raw);
        assert_eq!(outline.course_title, "Rust for Pythonistas");
        assert_eq!(names(&outline), vec!["Ownership", "Traits", "Macros"]);
        assert_eq!(outline.modules[0].lessons, vec!["Moves"]);
        assert_eq!(outline.modules[1].lessons, vec!["Generics"]);
        assert!(outline.modules[2].lessons.is_empty());
    }

    #[test]
    fn test_lesson_marker_is_case_sensitive() {
        let outline = parse_outline("Module 1: A\n- lesson: lower\n- Lesson: upper");
        assert_eq!(outline.modules[0].lessons, vec!["upper"]);
    }

    #[test]
    fn test_header_without_name_keeps_full_line() {
        let outline = parse_outline("Module 4:\n- Lesson: x");
        assert_eq!(outline.modules[0].module_name, "Module 4:");
    }

    #[test]
    fn test_module_word_without_number_is_not_a_header() {
        let outline = parse_outline("Module: Intro\n- Lesson: dropped");
        assert!(outline.modules.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let outline = parse_outline("");
        assert_eq!(outline.course_title, DEFAULT_COURSE_TITLE);
        assert!(outline.modules.is_empty());
    }

    #[test]
    fn test_blank_title_falls_back_to_default() {
        let outline = parse_outline("Course Title:   \nModule 1: A");
        assert_eq!(outline.course_title, DEFAULT_COURSE_TITLE);
    }

    #[test]
    fn test_counts_match_for_generated_outline() {
        let mut raw = String::from("Course Title: Generated\n");
        let lesson_counts = [4usize, 6, 0, 5];
        for (i, count) in lesson_counts.iter().enumerate() {
            raw.push_str(&format!("\nModule {}: M{}\n", i + 1, i + 1));
            for j in 0..*count {
                raw.push_str(&format!("- Lesson: L{}.{}\n", i + 1, j + 1));
            }
        }
        let outline = parse_outline(&raw);
        assert_eq!(outline.modules.len(), lesson_counts.len());
        for (module, count) in outline.modules.iter().zip(lesson_counts) {
            assert_eq!(module.lessons.len(), count);
        }
        assert_eq!(outline.modules[1].lessons[5], "L2.6");
    }
}
