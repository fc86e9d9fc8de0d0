//! Quiz response parser.
//!
//! Turns the free-form text returned by a generation provider into a list of
//! quiz questions. Structured JSON is tried first, then a line-oriented
//! heuristic for the "Question N / A) / Correct Answer: X" layout. When too
//! few questions survive, a built-in set for the topic is substituted. The
//! parser never fails; the fallback path is reported in [`ParseOutcome`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::fallback::fallback_questions;
use crate::model::{ParsedQuiz, QuizQuestion, MAX_QUESTIONS, MIN_QUESTIONS, OPTIONS_PER_QUESTION};

/// Leading markdown decoration: bullets, headings, block quotes.
static DECORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•>]\s+|#+\s*)+").unwrap());

/// `Question 3:`, `Question:`, `3.`, `3)`.
static QUESTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:question\s*\d*\s*[:.)\-]|\d+\s*[.):])\s*(.*)$").unwrap()
});

/// `A)`, `b.`, `(C)`.
static OPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(?([a-d])\s*[.)]\s*(.*)$").unwrap());

/// A standalone option letter after the answer label: `B`, `(c)`, `D.`.
/// The article in "is a mutable sequence (C)" does not count.
static ANSWER_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[\s(:=\-])\(?([a-d])(?:[).:,]|\s*$|\s+[^a-z\s])").unwrap()
});

static CORRECT_ANSWER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)correct\s+answer").unwrap());

/// `Explanation: ...`.
static EXPLANATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)explanation\s*[:\-]?\s*(.*)$").unwrap());

/// Which extraction strategy produced the questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseSource {
    /// A JSON array or object found in the response.
    Json,
    /// The line-oriented text heuristic.
    Text,
}

/// Why the built-in question set was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// Nothing usable was found.
    NoQuestions,
    /// Some questions were recovered, but fewer than the minimum.
    TooFewQuestions { found: usize },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoQuestions => write!(f, "no questions could be recovered"),
            FallbackReason::TooFewQuestions { found } => write!(
                f,
                "only {found} complete question(s) recovered, need at least {MIN_QUESTIONS}"
            ),
        }
    }
}

/// Result of parsing a generated response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Questions recovered from the response itself.
    Parsed {
        questions: ParsedQuiz,
        source: ParseSource,
    },
    /// The fixed question set for the topic.
    Fallback {
        questions: ParsedQuiz,
        reason: FallbackReason,
    },
}

impl ParseOutcome {
    pub fn questions(&self) -> &ParsedQuiz {
        match self {
            ParseOutcome::Parsed { questions, .. } | ParseOutcome::Fallback { questions, .. } => {
                questions
            }
        }
    }

    pub fn into_questions(self) -> ParsedQuiz {
        match self {
            ParseOutcome::Parsed { questions, .. } | ParseOutcome::Fallback { questions, .. } => {
                questions
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback { .. })
    }

    /// `"json"`, `"text"` or `"fallback"`.
    pub fn source_label(&self) -> &'static str {
        match self {
            ParseOutcome::Parsed {
                source: ParseSource::Json,
                ..
            } => "json",
            ParseOutcome::Parsed {
                source: ParseSource::Text,
                ..
            } => "text",
            ParseOutcome::Fallback { .. } => "fallback",
        }
    }
}

/// Parse a generated response into quiz questions.
///
/// `topic` is only consulted when the fallback set is needed.
pub fn parse_quiz_response(raw: &str, topic: &str) -> ParseOutcome {
    if let Some(questions) = extract_structured(raw) {
        tracing::debug!(count = questions.len(), "parsed structured quiz response");
        return ParseOutcome::Parsed {
            questions,
            source: ParseSource::Json,
        };
    }

    let mut questions = extract_from_text(raw);
    questions.truncate(MAX_QUESTIONS);

    if questions.len() >= MIN_QUESTIONS {
        tracing::debug!(count = questions.len(), "parsed textual quiz response");
        return ParseOutcome::Parsed {
            questions,
            source: ParseSource::Text,
        };
    }

    let reason = if questions.is_empty() {
        FallbackReason::NoQuestions
    } else {
        FallbackReason::TooFewQuestions {
            found: questions.len(),
        }
    };
    tracing::warn!(%topic, %reason, "using fallback question set");

    ParseOutcome::Fallback {
        questions: fallback_questions(topic),
        reason,
    }
}

// ---------------------------------------------------------------------------
// Structured extraction
// ---------------------------------------------------------------------------

/// Bound on candidate start positions tried while scanning for JSON.
const MAX_JSON_CANDIDATES: usize = 512;

/// Find and decode a JSON question list. Returns `None` on any failure so the
/// caller can fall through to the text heuristic.
fn extract_structured(raw: &str) -> Option<ParsedQuiz> {
    let cleaned = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(cleaned.trim()) {
        if let Some(questions) = questions_from_value(value) {
            return Some(questions);
        }
    }

    // Bracketed prose such as "[1, 2, 3]" may decode without holding any
    // questions, so keep scanning until a candidate yields one.
    let starts = cleaned
        .char_indices()
        .filter(|(_, c)| *c == '[' || *c == '{');
    for (tried, (start, _)) in starts.enumerate() {
        if tried == MAX_JSON_CANDIDATES {
            tracing::debug!(
                max = MAX_JSON_CANDIDATES,
                "stopped scanning for JSON after too many candidates"
            );
            break;
        }
        let Some(end) = balanced_end(&cleaned, start) else {
            continue;
        };
        let Ok(value) = serde_json::from_str(&cleaned[start..end]) else {
            continue;
        };
        if let Some(questions) = questions_from_value(value) {
            return Some(questions);
        }
    }
    None
}

/// The complete questions held by a decoded JSON array, or by the
/// `questions` field of an object. `None` when there are none.
fn questions_from_value(value: serde_json::Value) -> Option<ParsedQuiz> {
    let items = match value {
        serde_json::Value::Object(mut map) => match map.remove("questions") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return None,
        },
        serde_json::Value::Array(items) => items,
        _ => return None,
    };

    let questions: ParsedQuiz = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<QuizQuestion>(item).ok())
        .filter(QuizQuestion::is_complete)
        .map(ensure_answer)
        .take(MAX_QUESTIONS)
        .collect();

    if questions.is_empty() {
        None
    } else {
        Some(questions)
    }
}

/// Remove markdown code fences (```json ... ```), keeping their contents.
fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte offset just past the bracket that closes the one at `start`.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Default an unresolvable answer to the first option.
fn ensure_answer(mut question: QuizQuestion) -> QuizQuestion {
    if question.resolve_correct_option().is_none() {
        tracing::debug!(
            question = %question.question,
            answer = %question.correct_answer,
            "correct answer does not resolve, defaulting to first option"
        );
        question.correct_answer = question.options[0].clone();
    }
    question
}

// ---------------------------------------------------------------------------
// Line-oriented extraction
// ---------------------------------------------------------------------------

/// Accumulator for the question currently being read.
#[derive(Default)]
struct PendingQuestion {
    question: String,
    options: Vec<String>,
    correct: Option<String>,
    explanation: Option<String>,
}

impl PendingQuestion {
    /// Accept the question only if it collected exactly four options.
    fn finish(self) -> Option<QuizQuestion> {
        if self.options.len() != OPTIONS_PER_QUESTION {
            tracing::trace!(
                question = %self.question,
                options = self.options.len(),
                "dropping incomplete question"
            );
            return None;
        }
        let correct = self.correct.unwrap_or_else(|| self.options[0].clone());
        let mut question = QuizQuestion::new(self.question, self.options, correct);
        question.explanation = self.explanation;
        Some(question)
    }
}

/// Extract questions from "Question N / A) / Correct Answer: X" style text.
fn extract_from_text(raw: &str) -> ParsedQuiz {
    let mut questions = Vec::new();
    let mut current: Option<PendingQuestion> = None;

    for raw_line in raw.lines() {
        let line = clean_line(raw_line);
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = QUESTION_MARKER.captures(&line) {
            if let Some(done) = current.take().and_then(PendingQuestion::finish) {
                questions.push(done);
            }
            current = Some(PendingQuestion {
                question: clean_text(&caps[1]),
                ..Default::default()
            });
            continue;
        }

        let Some(pending) = current.as_mut() else {
            continue;
        };

        if let Some(caps) = OPTION_MARKER.captures(&line) {
            pending.options.push(clean_text(&caps[2]));
        } else if let Some(label) = CORRECT_ANSWER_LABEL.find(&line) {
            if let Some(caps) = ANSWER_LETTER.captures(&line[label.end()..]) {
                let idx = (caps[1].to_ascii_uppercase().as_bytes()[0] - b'A') as usize;
                match pending.options.get(idx) {
                    Some(option) => pending.correct = Some(option.clone()),
                    None => tracing::trace!(
                        letter = %&caps[1],
                        options = pending.options.len(),
                        "correct answer letter out of range"
                    ),
                }
            }
        } else if let Some(caps) = EXPLANATION.captures(&line) {
            let text = clean_text(&caps[1]);
            if !text.is_empty() {
                pending.explanation = Some(text);
            }
        } else if pending.options.is_empty() {
            // Question text on the line(s) after a bare marker.
            if pending.question.is_empty() {
                pending.question = line.clone();
            } else {
                pending.question.push(' ');
                pending.question.push_str(&line);
            }
        }
    }

    if let Some(done) = current.and_then(PendingQuestion::finish) {
        questions.push(done);
    }

    questions
}

/// Trim, drop bold markers and leading bullets/headings.
fn clean_line(line: &str) -> String {
    let without_bold = line.replace("**", "");
    let trimmed = without_bold.trim();
    DECORATION.replace(trimmed, "").trim().to_string()
}

fn clean_text(text: &str) -> String {
    text.trim().trim_matches(['*', '_']).trim().to_string()
}
