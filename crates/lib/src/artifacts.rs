//! # Artifact Codecs
//!
//! Two boundaries live here:
//!
//! - **Text → typed records**: best-effort extraction of quiz questions and
//!   flashcards from the AI provider's text, in the formats the quiz and
//!   flashcard prompts request.
//! - **Typed records ↔ stored text**: the JSON encoding used for the
//!   `questions` and `cards` columns. Decoding an encoded list yields the
//!   same list.

use crate::errors::EdumateError;
use crate::types::{Flashcard, QuizQuestion};
use regex::Regex;
use std::sync::LazyLock;

static QUESTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:question\s*\d*|q\d+)\s*[:.)]\s*(.*)$").unwrap());
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Da-d])[.)]\s*(.+)$").unwrap());
static ANSWER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:correct\s+)?answer\s*:\s*(.*)$").unwrap());

/// Strips list bullets and markdown emphasis that models like to add around keys.
fn clean_line(line: &str) -> String {
    line.trim()
        .trim_start_matches(['-', '*', '#', ' '])
        .replace("**", "")
        .trim()
        .to_string()
}

/// Extracts `Question:` / `Answer:` pairs as flashcards.
///
/// A question without a following answer is discarded. `Flashcard N:`
/// headers and commentary lines are ignored.
pub fn parse_flashcards(text: &str) -> Vec<Flashcard> {
    let mut cards = Vec::new();
    let mut pending_front: Option<String> = None;

    for raw in text.lines() {
        let line = clean_line(raw);
        if let Some(front) = value_after_key(&line, "question") {
            pending_front = Some(front.to_string());
        } else if let Some(back) = value_after_key(&line, "answer") {
            if let Some(front) = pending_front.take() {
                cards.push(Flashcard {
                    front,
                    back: back.to_string(),
                    tags: Vec::new(),
                    difficulty: None,
                });
            }
        }
    }

    cards
}

/// Extracts multiple-choice questions: a `Question N:` header, lettered
/// options, and an `Answer:` line.
pub fn parse_quiz(text: &str) -> Vec<QuizQuestion> {
    let mut questions = Vec::new();
    let mut current: Option<QuizQuestion> = None;

    for raw in text.lines() {
        let line = clean_line(raw);
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = QUESTION_HEADER.captures(&line) {
            if let Some(done) = current.take() {
                questions.push(done);
            }
            current = Some(QuizQuestion {
                question: caps[1].trim().to_string(),
                options: Vec::new(),
                answer: None,
            });
        } else if let Some(caps) = ANSWER_LINE.captures(&line) {
            if let Some(q) = current.as_mut() {
                let answer = caps[1].trim();
                if !answer.is_empty() {
                    q.answer = Some(answer.to_string());
                }
            }
        } else if let Some(caps) = OPTION_LINE.captures(&line) {
            if let Some(q) = current.as_mut() {
                q.options.push(format!(
                    "{}. {}",
                    caps[1].to_ascii_uppercase(),
                    caps[2].trim()
                ));
            }
        } else if let Some(q) = current.as_mut() {
            // Question text that wraps onto the next line.
            if q.options.is_empty() && q.answer.is_none() {
                if !q.question.is_empty() {
                    q.question.push(' ');
                }
                q.question.push_str(&line);
            }
        }
    }

    if let Some(done) = current {
        questions.push(done);
    }

    questions.retain(|q| !q.question.is_empty());
    questions
}

fn value_after_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let head = line.get(..key.len())?;
    if !head.eq_ignore_ascii_case(key) {
        return None;
    }
    let rest = line[key.len()..].trim_start();
    rest.strip_prefix(':').map(str::trim)
}

pub fn encode_flashcards(cards: &[Flashcard]) -> Result<String, EdumateError> {
    Ok(serde_json::to_string(cards)?)
}

pub fn decode_flashcards(stored: &str) -> Result<Vec<Flashcard>, EdumateError> {
    Ok(serde_json::from_str(stored)?)
}

pub fn encode_questions(questions: &[QuizQuestion]) -> Result<String, EdumateError> {
    Ok(serde_json::to_string(questions)?)
}

pub fn decode_questions(stored: &str) -> Result<Vec<QuizQuestion>, EdumateError> {
    Ok(serde_json::from_str(stored)?)
}
