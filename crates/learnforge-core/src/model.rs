//! Core data model types for learnforge.
//!
//! Quiz questions produced by the response parser, plus the persisted record
//! shapes shared by the store, the HTTP API and the API client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::learning_path::LearningModule;

/// Maximum number of questions kept from a single generation.
pub const MAX_QUESTIONS: usize = 10;

/// Minimum number of recovered questions before the fallback set is used.
pub const MIN_QUESTIONS: usize = 5;

/// Every accepted question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// The question text.
    pub question: String,
    /// Answer options, in display order.
    #[serde(default)]
    pub options: Vec<String>,
    /// The correct option text, or an option letter such as `"A"`.
    #[serde(
        default,
        alias = "correct_answer",
        alias = "answer",
        deserialize_with = "deserialize_answer"
    )]
    pub correct_answer: String,
    /// Optional explanation shown after answering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Fields we do not model, passed through verbatim. Modelled fields are
    /// normalized: the answer is always written as `correctAnswer` and a null
    /// explanation is omitted.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An ordered list of questions, at most [`MAX_QUESTIONS`] long.
pub type ParsedQuiz = Vec<QuizQuestion>;

impl QuizQuestion {
    /// Build a question from plain parts.
    pub fn new(
        question: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_answer: correct_answer.into(),
            explanation: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Attach an explanation.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Whether the question has the required number of options.
    pub fn is_complete(&self) -> bool {
        self.options.len() == OPTIONS_PER_QUESTION
    }

    /// Index of the correct option.
    ///
    /// Matches option text first, then a single option letter (`A`..`D`,
    /// case-insensitive). Returns `None` when neither resolves.
    pub fn resolve_correct_option(&self) -> Option<usize> {
        let answer = self.correct_answer.trim();
        if answer.is_empty() {
            return None;
        }
        if let Some(idx) = self.options.iter().position(|o| o.trim() == answer) {
            return Some(idx);
        }
        letter_index(answer).filter(|&idx| idx < self.options.len())
    }

    /// The text of the correct option, if it resolves.
    pub fn correct_option(&self) -> Option<&str> {
        self.resolve_correct_option()
            .map(|idx| self.options[idx].as_str())
    }
}

/// Map an option letter (`"A"`, `"b"`, `"C)"`) to a zero-based index.
pub fn letter_index(s: &str) -> Option<usize> {
    let trimmed = s.trim().trim_end_matches(['.', ')', ':']);
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let upper = first.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some((upper as u8 - b'A') as usize)
    } else {
        None
    }
}

/// Accept a correct answer given as a string or as a zero-based option index.
fn deserialize_answer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Answer {
        Text(String),
        Index(u64),
    }

    Ok(match Answer::deserialize(deserializer)? {
        Answer::Text(s) => s,
        Answer::Index(i) if i < 26 => char::from(b'A' + i as u8).to_string(),
        Answer::Index(i) => i.to_string(),
    })
}

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Parent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Instructor => write!(f, "instructor"),
            Role::Parent => write!(f, "parent"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "parent" => Ok(Role::Parent),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Lifecycle state of a learning path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningPathStatus {
    Active,
    Completed,
    #[default]
    Pending,
}

impl fmt::Display for LearningPathStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearningPathStatus::Active => write!(f, "active"),
            LearningPathStatus::Completed => write!(f, "completed"),
            LearningPathStatus::Pending => write!(f, "pending"),
        }
    }
}

impl FromStr for LearningPathStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(LearningPathStatus::Active),
            "completed" => Ok(LearningPathStatus::Completed),
            "pending" => Ok(LearningPathStatus::Pending),
            other => Err(format!("unknown learning path status: {other}")),
        }
    }
}

/// Public view of a user account (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

/// A saved quiz. `questions` holds the serialized [`ParsedQuiz`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub learning_path_id: Option<i64>,
    pub title: String,
    pub topic: String,
    pub questions: String,
    pub created_at: String,
    pub updated_at: String,
}

impl QuizRecord {
    /// Decode the stored question blob.
    pub fn parsed_questions(&self) -> serde_json::Result<ParsedQuiz> {
        serde_json::from_str(&self.questions)
    }
}

/// A saved learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathRecord {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    pub status: LearningPathStatus,
    #[serde(default)]
    pub modules: Vec<LearningModule>,
    pub created_at: String,
    pub updated_at: String,
}

/// Completion of one module of a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: i64,
    pub user_id: i64,
    pub learning_path_id: i64,
    pub module: String,
    pub completion: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_path: Option<LearningPathSummary>,
    pub created_at: String,
    pub updated_at: String,
}

/// Title and description of the path a progress row belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPathSummary {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}
