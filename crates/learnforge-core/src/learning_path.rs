//! Weekly module outlines for learning paths.

use serde::{Deserialize, Serialize};

/// One week of a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningModule {
    pub id: u32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A lesson inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Longest outline generated, in weeks.
pub const MAX_WEEKS: u32 = 52;

/// Build one module per week of `duration`.
///
/// The week count is the leading integer of the duration string, so
/// `"4-weeks"`, `"6 weeks"` and `"8"` all work. A duration without a leading
/// number yields no modules.
pub fn outline_modules(topic: &str, duration: &str) -> Vec<LearningModule> {
    let weeks = leading_number(duration).unwrap_or(0).min(MAX_WEEKS);

    (1..=weeks)
        .map(|week| {
            let week_title = week_title(topic, week);
            LearningModule {
                id: week,
                title: format!("Week {week}: {week_title}"),
                description: format!(
                    "Master key concepts and practical skills in {topic} through hands-on exercises and real-world projects."
                ),
                completed: false,
                lessons: vec![
                    lesson(1, format!("Introduction to {week_title}")),
                    lesson(2, "Practical Exercises".into()),
                    lesson(3, "Hands-on Project".into()),
                    lesson(4, "Review and Assessment".into()),
                ],
            }
        })
        .collect()
}

/// Percentage of completed modules, rounded to the nearest integer.
pub fn completion_percent(modules: &[LearningModule]) -> u32 {
    if modules.is_empty() {
        return 0;
    }
    let done = modules.iter().filter(|m| m.completed).count();
    ((done as f64 / modules.len() as f64) * 100.0).round() as u32
}

fn lesson(id: u32, title: String) -> Lesson {
    Lesson {
        id,
        title,
        completed: false,
    }
}

fn week_title(topic: &str, week: u32) -> String {
    match week {
        1 => format!("{topic} Fundamentals"),
        2 => "Core Concepts".into(),
        3 => "Intermediate Techniques".into(),
        4 => "Advanced Applications".into(),
        5 => "Real-world Projects".into(),
        6 => "Optimization & Best Practices".into(),
        7 => "Industry Standards".into(),
        8 => "Capstone Project".into(),
        _ => format!("Advanced {topic} Topics"),
    }
}

fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
