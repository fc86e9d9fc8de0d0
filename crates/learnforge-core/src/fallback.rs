//! Built-in question sets used when a generated quiz cannot be recovered.
//!
//! Selection is a case-insensitive keyword match against the topic, so the
//! same topic string always yields the same set.

use crate::model::{ParsedQuiz, QuizQuestion};

/// Select the fallback set for `topic`.
pub fn fallback_questions(topic: &str) -> ParsedQuiz {
    let lowered = topic.to_lowercase();
    if lowered.contains("python") {
        python_questions()
    } else if lowered.contains("javascript") {
        javascript_questions()
    } else {
        generic_questions(topic)
    }
}

fn q(question: &str, options: [&str; 4], correct: usize, explanation: &str) -> QuizQuestion {
    QuizQuestion::new(question, options, options[correct]).with_explanation(explanation)
}

/// Ten-question Python set.
pub fn python_questions() -> ParsedQuiz {
    vec![
        q(
            "What is Python?",
            [
                "A programming language",
                "A type of snake only",
                "A database system",
                "An operating system",
            ],
            0,
            "Python is a high-level, general-purpose programming language.",
        ),
        q(
            "Which keyword is used to define a function in Python?",
            ["func", "def", "function", "lambda"],
            1,
            "Functions are declared with the `def` keyword.",
        ),
        q(
            "What is the output of `print(type([]))`?",
            [
                "<class 'tuple'>",
                "<class 'dict'>",
                "<class 'list'>",
                "<class 'set'>",
            ],
            2,
            "Square brackets create a list.",
        ),
        q(
            "Which of these data types is immutable?",
            ["list", "dict", "set", "tuple"],
            3,
            "Tuples cannot be modified after creation.",
        ),
        q(
            "How do you start a comment in Python?",
            ["//", "#", "/*", "--"],
            1,
            "Single-line comments begin with `#`.",
        ),
        q(
            "What does `len(\"hello\")` return?",
            ["4", "5", "6", "An error"],
            1,
            "The string has five characters.",
        ),
        q(
            "Which statement is used to handle exceptions?",
            ["try/except", "catch/throw", "do/while", "if/else"],
            0,
            "Exceptions are caught with `try` and `except` blocks.",
        ),
        q(
            "What is the correct file extension for Python files?",
            [".pt", ".pyt", ".py", ".python"],
            2,
            "Python source files use the `.py` extension.",
        ),
        q(
            "Which built-in function reads input from the user?",
            ["scan()", "input()", "read()", "get()"],
            1,
            "`input()` reads a line from standard input.",
        ),
        q(
            "What does the `range(3)` call produce when iterated?",
            ["1, 2, 3", "0, 1, 2, 3", "0, 1, 2", "3, 2, 1"],
            2,
            "`range(3)` yields 0, 1 and 2.",
        ),
    ]
}

/// Ten-question JavaScript set.
pub fn javascript_questions() -> ParsedQuiz {
    vec![
        q(
            "What is JavaScript?",
            [
                "A programming language for the web",
                "A version of Java",
                "A database engine",
                "A CSS framework",
            ],
            0,
            "JavaScript is the scripting language of web browsers.",
        ),
        q(
            "Which keyword declares a block-scoped constant?",
            ["var", "let", "const", "static"],
            2,
            "`const` declares a block-scoped binding that cannot be reassigned.",
        ),
        q(
            "What does `typeof null` evaluate to?",
            ["\"null\"", "\"object\"", "\"undefined\"", "\"number\""],
            1,
            "A long-standing quirk: `typeof null` is \"object\".",
        ),
        q(
            "Which operator checks equality without type coercion?",
            ["==", "=", "===", "!="],
            2,
            "Strict equality `===` compares value and type.",
        ),
        q(
            "Which method adds an element to the end of an array?",
            ["push()", "pop()", "shift()", "slice()"],
            0,
            "`push()` appends elements and returns the new length.",
        ),
        q(
            "What does JSON stand for?",
            [
                "Java Standard Object Notation",
                "JavaScript Object Notation",
                "JavaScript Online Network",
                "Joined Serial Object Nodes",
            ],
            1,
            "JSON is JavaScript Object Notation.",
        ),
        q(
            "Which function parses a string into an integer?",
            ["Number.toInt()", "parseInt()", "int()", "Math.int()"],
            1,
            "`parseInt()` parses an integer from a string.",
        ),
        q(
            "What keyword waits for a Promise inside an async function?",
            ["yield", "then", "await", "defer"],
            2,
            "`await` pauses until the Promise settles.",
        ),
        q(
            "Which value is falsy in JavaScript?",
            ["\"0\"", "[]", "{}", "0"],
            3,
            "The number 0 is falsy; the others are truthy.",
        ),
        q(
            "How do you write a single-line comment?",
            ["# comment", "// comment", "<!-- comment -->", "-- comment"],
            1,
            "Single-line comments begin with `//`.",
        ),
    ]
}

/// Five placeholder questions that name the topic.
pub fn generic_questions(topic: &str) -> ParsedQuiz {
    let topic = match topic.trim() {
        "" => "your chosen topic",
        t => t,
    };
    vec![
        q(
            &format!("What is the best first step when learning {topic}?"),
            [
                "Understand the fundamental concepts",
                "Memorize advanced edge cases",
                "Skip the basics entirely",
                "Avoid practice exercises",
            ],
            0,
            "Solid fundamentals make every later topic easier.",
        ),
        q(
            &format!("Which habit helps most when studying {topic}?"),
            [
                "Studying once a year",
                "Regular, spaced practice",
                "Reading without taking notes",
                "Avoiding feedback",
            ],
            1,
            "Spaced repetition improves long-term retention.",
        ),
        q(
            &format!("How can you check your understanding of {topic}?"),
            [
                "Assume you understand it",
                "Never test yourself",
                "Explain it in your own words",
                "Only reread the material",
            ],
            2,
            "Explaining a concept exposes gaps in understanding.",
        ),
        q(
            &format!("What is a good resource for learning {topic}?"),
            [
                "Unverified rumours",
                "Random guesses",
                "Outdated hearsay",
                "Reputable courses and documentation",
            ],
            3,
            "Prefer well-maintained, reputable sources.",
        ),
        q(
            &format!("What should you do after finishing the basics of {topic}?"),
            [
                "Apply them in a small project",
                "Stop learning",
                "Forget what you learned",
                "Start over from scratch",
            ],
            0,
            "Projects turn knowledge into skill.",
        ),
    ]
}
