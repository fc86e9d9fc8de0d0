pub mod init;
pub mod list_models;
pub mod parse;
pub mod paths;
pub mod quiz;
pub mod quizzes;
pub mod serve;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use learnforge_core::parser::ParseOutcome;

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Print a parse outcome as JSON or as a table.
pub fn print_outcome(outcome: &ParseOutcome, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(outcome.questions())?),
        "table" => {
            match outcome {
                ParseOutcome::Parsed { questions, .. } => eprintln!(
                    "Parsed {} question(s) from {} output",
                    questions.len(),
                    outcome.source_label()
                ),
                ParseOutcome::Fallback { questions, reason } => eprintln!(
                    "Using {} fallback question(s): {reason}",
                    questions.len()
                ),
            }
            println!("{}", questions_table(outcome));
        }
        other => anyhow::bail!("unknown format: {other} (expected json or table)"),
    }
    Ok(())
}

fn questions_table(outcome: &ParseOutcome) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Options", "Answer"]);

    for (i, question) in outcome.questions().iter().enumerate() {
        let options = question
            .options
            .iter()
            .enumerate()
            .map(|(j, option)| format!("{}) {option}", (b'A' + j as u8) as char))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&question.question),
            Cell::new(options),
            Cell::new(question.correct_option().unwrap_or(&question.correct_answer)),
        ]);
    }
    table
}
