//! Scoring submitted quiz answers.

use serde::{Deserialize, Serialize};

use crate::model::{letter_index, QuizQuestion};

/// Coarse feedback band for a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// 80 % and above.
    Excellent,
    /// 60 % and above.
    Passing,
    NeedsWork,
}

impl ScoreBand {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Passing,
            _ => ScoreBand::NeedsWork,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent work!",
            ScoreBand::Passing => "Good job, keep practicing.",
            ScoreBand::NeedsWork => "Review the material and try again.",
        }
    }
}

/// Outcome for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question: String,
    pub given: Option<String>,
    pub correct_answer: Option<String>,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Summary of a graded submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
    pub band: ScoreBand,
    pub results: Vec<QuestionResult>,
}

/// Grade `answers` against `questions`, position by position.
///
/// Each answer may be the option text or its letter. Missing answers count
/// as wrong; surplus answers are ignored.
pub fn grade(questions: &[QuizQuestion], answers: &[String]) -> GradeReport {
    let results: Vec<QuestionResult> = questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let given = answers.get(i).map(|a| a.trim().to_string());
            let expected = question.resolve_correct_option();
            let chosen = given
                .as_deref()
                .and_then(|answer| chosen_index(question, answer));
            QuestionResult {
                question: question.question.clone(),
                given,
                correct_answer: question.correct_option().map(str::to_string),
                is_correct: expected.is_some() && chosen == expected,
                explanation: question.explanation.clone(),
            }
        })
        .collect();

    let total = results.len();
    let correct = results.iter().filter(|r| r.is_correct).count();
    let percentage = if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    };

    GradeReport {
        correct,
        total,
        percentage,
        band: ScoreBand::from_percentage(percentage),
        results,
    }
}

fn chosen_index(question: &QuizQuestion, answer: &str) -> Option<usize> {
    if answer.is_empty() {
        return None;
    }
    question
        .options
        .iter()
        .position(|o| o.trim() == answer)
        .or_else(|| letter_index(answer).filter(|&idx| idx < question.options.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion::new("1+1?", ["1", "2", "3", "4"], "2"),
            QuizQuestion::new("Capital of France?", ["Rome", "Paris", "Oslo", "Bern"], "B"),
            QuizQuestion::new("Largest?", ["a", "b", "c", "d"], "d").with_explanation("d is big"),
        ]
    }

    #[test]
    fn matches_by_text_or_letter() {
        let answers = vec!["B".to_string(), "Paris".to_string(), "d".to_string()];
        let report = grade(&quiz(), &answers);
        assert_eq!(report.correct, 3);
        assert_eq!(report.percentage, 100);
        assert_eq!(report.band, ScoreBand::Excellent);
        assert_eq!(report.results[1].correct_answer.as_deref(), Some("Paris"));
    }

    #[test]
    fn missing_answers_are_wrong() {
        let report = grade(&quiz(), &["2".to_string()]);
        assert_eq!(report.correct, 1);
        assert_eq!(report.total, 3);
        assert_eq!(report.percentage, 33);
        assert_eq!(report.band, ScoreBand::NeedsWork);
        assert!(report.results[2].given.is_none());
        assert_eq!(report.results[2].explanation.as_deref(), Some("d is big"));
    }

    #[test]
    fn bands() {
        assert_eq!(ScoreBand::from_percentage(80), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_percentage(79), ScoreBand::Passing);
        assert_eq!(ScoreBand::from_percentage(60), ScoreBand::Passing);
        assert_eq!(ScoreBand::from_percentage(59), ScoreBand::NeedsWork);
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let report = grade(&[], &[]);
        assert_eq!(report.total, 0);
        assert_eq!(report.percentage, 0);
    }
}
