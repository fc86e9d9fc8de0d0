//! Prompt templates sent to the generation gateway.

/// System prompt used for quiz generation.
pub const QUIZ_SYSTEM_PROMPT: &str = "You are an educational assistant that writes clear, accurate multiple-choice questions. Respond with JSON only.";

/// Prompt asking for a multiple-choice quiz on `topic`.
pub fn quiz_prompt(topic: &str) -> String {
    format!(
        "Generate 5-10 multiple-choice questions based on the topic \"{topic}\". \
         Each question should have 4 options (A, B, C, D) with one correct answer. \
         Return the response as a JSON array of objects, where each object has: \
         question (string), options (array of 4 strings), correctAnswer (string, e.g., 'A'), \
         and optionally explanation (string). Format the JSON clearly."
    )
}

/// Prompt asking for a structured learning path.
pub fn learning_path_prompt(topic: &str, level: &str, duration: &str) -> String {
    format!(
        "Create a comprehensive {level} level learning path for {topic} that spans {duration}. \
         Include weekly milestones, resources, and practical projects. \
         Format as a structured learning journey."
    )
}
